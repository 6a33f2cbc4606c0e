//! Analyses over memory location ranges.
//!
//! - [`diophantine`]: common values of two bounded arithmetic progressions
//! - [`delinearize`]: flat byte ranges as multi-dimensional blocks
//! - [`difference`]: leftovers of a progression after removing a subset
//! - [`intersect`]: the intersection/difference engine
//! - [`verify`]: brute-force checking of engine results

pub mod diophantine;
pub mod delinearize;
pub mod difference;
pub mod intersect;
pub mod verify;

pub use diophantine::{extended_gcd, intersect_progressions, solve_two_variable, LinearSolution};
pub use delinearize::{delinearize, try_delinearize};
pub use difference::{difference, Pieces, ThresholdExceeded};
pub use intersect::{intersect, Complements, Intersection, RangeEngine};
pub use verify::{check, VerifyReport};
