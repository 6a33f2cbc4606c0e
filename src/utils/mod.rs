//! Utility modules.
//!
//! - Error types
//! - Solution printing

pub mod errors;
pub mod solution_print;

// Re-exports
pub use errors::*;
pub use solution_print::{print_solution, SolutionPrinter};
