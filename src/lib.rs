//! # memloc - Memory Location Range Intersection
//!
//! Decides whether two memory access footprints on the same base object
//! overlap, and where. Footprints are either flat byte ranges or strided
//! multi-dimensional accesses (one arithmetic progression per array
//! dimension). The engine:
//! - delinearizes a flat range against a multi-dimensional one when possible
//! - intersects strided dimensions by solving linear Diophantine equations
//! - splits each side into the part inside and outside the intersection
//! - degrades to a conservative "may overlap" answer when the shapes are
//!   beyond what it can compute exactly
//!
//! ## Example
//!
//! ```rust
//! use memloc::prelude::*;
//!
//! let a = BaseId::new(0);
//! // A[0..100]
//! let all = MemoryLocationRange::collapsed(a, 4, vec![Dimension::new(0, 1, 100, 100)]);
//! // A[0], A[2], ..., A[98]
//! let even = MemoryLocationRange::collapsed(a, 4, vec![Dimension::new(0, 2, 50, 100)]);
//!
//! let engine = RangeEngine::new();
//! let (result, complements) = engine.intersect_with_complements(&all, &even);
//! assert_eq!(result, Intersection::Exact(even.clone()));
//! // The odd elements are left over.
//! assert_eq!(complements.left[0].dims, vec![Dimension::new(1, 2, 50, 100)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod location;
pub mod analysis;
pub mod query;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::location::{BaseId, Dimension, LocKind, MemoryLocationRange};
    pub use crate::analysis::{
        intersect, Complements, Intersection, RangeEngine,
        delinearize, difference, intersect_progressions,
    };
    pub use crate::EngineConfig;
    pub use crate::utils::errors::*;
}

pub use analysis::{intersect, Complements, Intersection, RangeEngine};
pub use location::{BaseId, Dimension, LocKind, MemoryLocationRange};

use serde::{Deserialize, Serialize};

/// Default bound on the number of gap progressions per complement dimension.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Configuration for the intersection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of gap progressions a complement may need in one
    /// dimension before that side falls back to a non-collapsable marker
    pub threshold: usize,
    /// Compute left/right complements
    pub compute_complements: bool,
    /// Log a dump of every exact solution at trace level
    pub trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            compute_complements: true,
            trace: false,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the complement threshold.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable/disable complement computation.
    pub fn compute_complements(mut self, enabled: bool) -> Self {
        self.compute_complements = enabled;
        self
    }

    /// Enable/disable solution dumps.
    pub fn trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
