//! Memory location ranges: the footprint of accesses to one base object.

use super::dimension::Dimension;
use crate::utils::errors::{LocationError, LocationErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of the underlying base object of an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BaseId(pub u64);

impl BaseId {
    /// Create a base id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Shape of a memory location range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocKind {
    /// Flat byte range `[lower_bound, upper_bound)`
    Default,
    /// Multi-dimensional strided description in `dims`
    Collapsed,
    /// Shape could not be established; may overlap anywhere
    NonCollapsable,
}

impl LocKind {
    /// Get a short name for the kind.
    pub fn short_name(&self) -> &'static str {
        match self {
            LocKind::Default => "default",
            LocKind::Collapsed => "collapsed",
            LocKind::NonCollapsable => "non-collapsable",
        }
    }
}

/// The accessed footprint of one base pointer.
///
/// For a [`LocKind::Default`] location the bounds describe a half-open byte
/// interval, where `None` means unknown on that side. For a
/// [`LocKind::Collapsed`] location `dims` holds one entry per array dimension,
/// outermost first, and the bounds hold `[0, element size)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryLocationRange {
    /// Base object
    pub ptr: BaseId,
    /// Shape discriminator
    pub kind: LocKind,
    /// Lower byte bound
    #[serde(default)]
    pub lower_bound: Option<u64>,
    /// Upper byte bound (exclusive)
    #[serde(default)]
    pub upper_bound: Option<u64>,
    /// Per-dimension ranges, outermost first
    #[serde(default)]
    pub dims: Vec<Dimension>,
}

impl MemoryLocationRange {
    /// A flat byte range `[lower, upper)`.
    pub fn flat(ptr: BaseId, lower: u64, upper: u64) -> Self {
        Self::with_bounds(ptr, Some(lower), Some(upper))
    }

    /// A flat byte range with possibly unknown bounds.
    pub fn with_bounds(ptr: BaseId, lower: Option<u64>, upper: Option<u64>) -> Self {
        Self {
            ptr,
            kind: LocKind::Default,
            lower_bound: lower,
            upper_bound: upper,
            dims: Vec::new(),
        }
    }

    /// A flat range with no known bounds.
    pub fn unbounded(ptr: BaseId) -> Self {
        Self::with_bounds(ptr, None, None)
    }

    /// A multi-dimensional strided range over elements of `elem_size` bytes.
    pub fn collapsed(ptr: BaseId, elem_size: u64, dims: Vec<Dimension>) -> Self {
        Self {
            ptr,
            kind: LocKind::Collapsed,
            lower_bound: Some(0),
            upper_bound: Some(elem_size),
            dims,
        }
    }

    /// Check if this location has a multi-dimensional description.
    pub fn is_collapsed(&self) -> bool {
        self.kind == LocKind::Collapsed
    }

    /// Element size of a collapsed location.
    pub fn element_size(&self) -> Option<u64> {
        match self.kind {
            LocKind::Collapsed => self.upper_bound,
            _ => None,
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Copy of this location with dimension `idx` replaced.
    pub fn with_dim(&self, idx: usize, dim: Dimension) -> Self {
        let mut loc = self.clone();
        loc.dims[idx] = dim;
        loc
    }

    /// Turn this location into a "may overlap anywhere" marker on the same base.
    pub fn into_non_collapsable(mut self) -> Self {
        self.dims.clear();
        self.kind = LocKind::NonCollapsable;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), LocationError> {
        match self.kind {
            LocKind::Default => {
                if let (Some(lower), Some(upper)) = (self.lower_bound, self.upper_bound) {
                    if lower > upper {
                        return Err(LocationError::new(
                            format!("inverted bounds [{}, {}) on {}", lower, upper, self.ptr),
                            LocationErrorKind::InvertedBounds,
                        ));
                    }
                }
            }
            LocKind::Collapsed => {
                if self.dims.is_empty() {
                    return Err(LocationError::new(
                        format!("collapsed location on {} has no dimensions", self.ptr),
                        LocationErrorKind::NoDimensions,
                    ));
                }
                if !matches!(self.upper_bound, Some(size) if size > 0) {
                    return Err(LocationError::new(
                        format!("collapsed location on {} has no element size", self.ptr),
                        LocationErrorKind::MissingElementSize,
                    ));
                }
                for (i, dim) in self.dims.iter().enumerate() {
                    if dim.step == 0 {
                        return Err(LocationError::new(
                            format!("dimension {} of {} has zero step", i, self.ptr),
                            LocationErrorKind::ZeroStep,
                        ));
                    }
                    if dim.trip_count == 0 {
                        return Err(LocationError::new(
                            format!("dimension {} of {} has zero trip count", i, self.ptr),
                            LocationErrorKind::ZeroTripCount,
                        ));
                    }
                    if dim.checked_end().is_none() {
                        return Err(LocationError::new(
                            format!("dimension {} of {} ends past u64::MAX", i, self.ptr),
                            LocationErrorKind::Overflow,
                        ));
                    }
                }
            }
            LocKind::NonCollapsable => {}
        }
        Ok(())
    }

    /// Byte strides of a collapsed location, outermost first.
    ///
    /// Entry `i` is the size in bytes of one index step in dimension `i - 1`
    /// (so the last entry is the element size and the first is the size of
    /// the whole array, or 0 when the outermost extent is unknown).
    pub fn byte_strides(&self) -> Option<Vec<u64>> {
        let elem_size = self.element_size().filter(|&size| size > 0)?;
        let n = self.dims.len();
        let mut strides = vec![0u64; n + 1];
        strides[n] = elem_size;
        for idx in (0..n).rev() {
            strides[idx] = self.dims[idx].dim_size.checked_mul(strides[idx + 1])?;
            if strides[idx] == 0 && idx > 0 {
                return None;
            }
        }
        Some(strides)
    }

    /// Enumerate the touched bytes.
    ///
    /// Returns `None` when the footprint is not known precisely or would
    /// contain more than `limit` bytes.
    pub fn byte_points(&self, limit: u64) -> Option<BTreeSet<u64>> {
        match self.kind {
            LocKind::Default => {
                let (lower, upper) = (self.lower_bound?, self.upper_bound?);
                if upper.saturating_sub(lower) > limit {
                    return None;
                }
                Some((lower..upper).collect())
            }
            LocKind::Collapsed => {
                let strides = self.byte_strides()?;
                let elem_size = strides[self.dims.len()];
                let mut total = elem_size;
                for (i, dim) in self.dims.iter().enumerate() {
                    if !dim.is_well_formed() {
                        return None;
                    }
                    if (i > 0 || dim.dim_size > 0) && dim.end() >= dim.dim_size {
                        return None;
                    }
                    total = total.checked_mul(dim.trip_count)?;
                }
                if total > limit {
                    return None;
                }
                let mut offsets = vec![0u64];
                for (i, dim) in self.dims.iter().enumerate() {
                    let stride = strides[i + 1];
                    offsets = offsets
                        .iter()
                        .flat_map(|&base| dim.values().map(move |v| base + v * stride))
                        .collect();
                }
                Some(
                    offsets
                        .into_iter()
                        .flat_map(|off| off..off + elem_size)
                        .collect(),
                )
            }
            LocKind::NonCollapsable => None,
        }
    }
}

impl fmt::Display for MemoryLocationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocKind::Default => {
                write!(f, "{} [", self.ptr)?;
                match self.lower_bound {
                    Some(lower) => write!(f, "{}", lower)?,
                    None => write!(f, "?")?,
                }
                write!(f, ", ")?;
                match self.upper_bound {
                    Some(upper) => write!(f, "{}", upper)?,
                    None => write!(f, "?")?,
                }
                write!(f, ")")
            }
            LocKind::Collapsed => {
                write!(f, "{}", self.ptr)?;
                for dim in &self.dims {
                    write!(f, "[{}]", dim)?;
                }
                Ok(())
            }
            LocKind::NonCollapsable => write!(f, "{} <non-collapsable>", self.ptr),
        }
    }
}
