//! Data model for memory access footprints.
//!
//! - [`Dimension`]: one axis of a strided access
//! - [`MemoryLocationRange`]: the footprint of accesses to one base object

pub mod dimension;
pub mod range;

pub use dimension::Dimension;
pub use range::{BaseId, LocKind, MemoryLocationRange};
