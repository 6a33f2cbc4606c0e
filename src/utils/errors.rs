//! Error types for memloc.
//!
//! The intersection engine itself never fails: every irregular input degrades
//! to a conservative answer. The types here cover malformed locations handed
//! in from outside (query files, collectors) and the driver's I/O.

use thiserror::Error;
use std::fmt;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum MemLocError {
    /// A memory location violates its structural invariants
    #[error("Invalid location: {0}")]
    Location(#[from] LocationError),

    /// A query file is malformed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A memory location that violates its structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct LocationError {
    /// The error message
    pub message: String,
    /// The kind of location error
    pub kind: LocationErrorKind,
}

impl LocationError {
    /// Create a new location error.
    pub fn new(message: impl Into<String>, kind: LocationErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kind of [`LocationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorKind {
    /// A dimension has a zero step
    ZeroStep,
    /// A dimension has a zero trip count
    ZeroTripCount,
    /// A collapsed location has no (or a zero) element size
    MissingElementSize,
    /// A collapsed location has no dimensions
    NoDimensions,
    /// Lower bound of a flat range exceeds its upper bound
    InvertedBounds,
    /// The last position of a dimension does not fit in `u64`
    Overflow,
}

/// A malformed query file.
#[derive(Error, Debug, Clone)]
pub struct QueryError {
    /// The error message
    pub message: String,
    /// Index of the offending query (if applicable)
    pub index: Option<usize>,
    /// The kind of query error
    pub kind: QueryErrorKind,
}

impl QueryError {
    /// Create a new query error.
    pub fn new(message: impl Into<String>, kind: QueryErrorKind) -> Self {
        Self {
            message: message.into(),
            index: None,
            kind,
        }
    }

    /// Attach the index of the offending query.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.index {
            write!(f, "{} (query #{})", self.message, index)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Kind of [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The file contains no queries
    Empty,
    /// One of the locations is malformed
    InvalidLocation,
}

/// Result type using MemLocError.
pub type MemLocResult<T> = Result<T, MemLocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::new("lhs: dimension 0 of %1 has zero step", QueryErrorKind::InvalidLocation)
            .at(3);
        let s = format!("{}", err);
        assert!(s.contains("zero step"));
        assert!(s.contains("#3"));
    }

    #[test]
    fn test_location_error_converts() {
        let err: MemLocError = LocationError::new("bad", LocationErrorKind::ZeroStep).into();
        assert!(matches!(err, MemLocError::Location(_)));
        assert!(err.to_string().starts_with("Invalid location"));
    }
}
