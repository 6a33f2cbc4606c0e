//! Brute-force checking of intersection results.
//!
//! Both inputs are enumerated byte by byte and the engine's answer is compared
//! against the enumeration:
//! - a disjointness claim must be backed by an empty common set;
//! - an exact intersection must touch precisely the common bytes;
//! - complement pieces must be pairwise disjoint, miss the intersection, and
//!   together cover the rest of their side.
//!
//! Only small footprints can be checked; anything larger than the limit, or
//! with unknown bounds, is skipped.

use super::intersect::{Complements, Intersection};
use crate::location::{LocKind, MemoryLocationRange};
use std::collections::BTreeSet;
use std::fmt;

/// Default cap on the number of bytes enumerated per location.
pub const DEFAULT_VERIFY_LIMIT: u64 = 1 << 16;

/// The property a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Disjointness was claimed for overlapping footprints
    Soundness,
    /// The exact intersection differs from the common bytes
    Exactness,
    /// Complement pieces do not cover the rest of their side
    Completeness,
    /// Complement pieces overlap each other or the intersection
    Disjointness,
}

/// A broken property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which property
    pub property: Property,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.property, self.message)
    }
}

/// Outcome of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyReport {
    /// Every applicable property holds
    Passed,
    /// The inputs could not be enumerated
    Skipped(String),
    /// At least one property is broken
    Failed(Vec<Violation>),
}

impl VerifyReport {
    /// Check that no violation was found.
    pub fn is_ok(&self) -> bool {
        !matches!(self, VerifyReport::Failed(_))
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyReport::Passed => write!(f, "passed"),
            VerifyReport::Skipped(reason) => write!(f, "skipped ({})", reason),
            VerifyReport::Failed(violations) => {
                write!(f, "FAILED")?;
                for v in violations {
                    write!(f, "\n  {}", v)?;
                }
                Ok(())
            }
        }
    }
}

/// Check `result` (and `complements`, if given) against enumeration.
pub fn check(
    lhs: &MemoryLocationRange,
    rhs: &MemoryLocationRange,
    result: &Intersection,
    complements: Option<&Complements>,
    limit: u64,
) -> VerifyReport {
    if lhs.ptr != rhs.ptr {
        return VerifyReport::Skipped("different base objects".to_string());
    }
    let (Some(l), Some(r)) = (lhs.byte_points(limit), rhs.byte_points(limit)) else {
        return VerifyReport::Skipped("footprint cannot be enumerated".to_string());
    };
    let common: BTreeSet<u64> = l.intersection(&r).copied().collect();

    let mut violations = Vec::new();
    match result {
        Intersection::Incomparable | Intersection::MayOverlap => {}
        Intersection::Disjoint => {
            if let Some(first) = common.first() {
                violations.push(Violation {
                    property: Property::Soundness,
                    message: format!("claimed disjoint but {} bytes are shared, first at {}", common.len(), first),
                });
            }
        }
        Intersection::Exact(int) => {
            match int.byte_points(limit) {
                Some(points) if points == common => {}
                Some(points) => violations.push(Violation {
                    property: Property::Exactness,
                    message: format!(
                        "intersection touches {} bytes, inputs share {}",
                        points.len(),
                        common.len()
                    ),
                }),
                None => violations.push(Violation {
                    property: Property::Exactness,
                    message: format!("intersection {} cannot be enumerated", int),
                }),
            }
            if let Some(complements) = complements {
                check_side("left", &l, &common, &complements.left, limit, &mut violations);
                check_side("right", &r, &common, &complements.right, limit, &mut violations);
            }
        }
    }

    if violations.is_empty() {
        VerifyReport::Passed
    } else {
        VerifyReport::Failed(violations)
    }
}

fn check_side(
    name: &str,
    side: &BTreeSet<u64>,
    common: &BTreeSet<u64>,
    pieces: &[MemoryLocationRange],
    limit: u64,
    violations: &mut Vec<Violation>,
) {
    if pieces.iter().any(|p| p.kind == LocKind::NonCollapsable) {
        return;
    }
    let mut covered = common.clone();
    for piece in pieces {
        let Some(points) = piece.byte_points(limit) else {
            violations.push(Violation {
                property: Property::Completeness,
                message: format!("{} piece {} cannot be enumerated", name, piece),
            });
            return;
        };
        if points.iter().any(|b| !side.contains(b)) {
            violations.push(Violation {
                property: Property::Completeness,
                message: format!("{} piece {} leaves its side", name, piece),
            });
        }
        for b in points {
            if !covered.insert(b) {
                violations.push(Violation {
                    property: Property::Disjointness,
                    message: format!("{} piece {} covers byte {} twice", name, piece, b),
                });
                break;
            }
        }
    }
    if !side.is_subset(&covered) {
        violations.push(Violation {
            property: Property::Completeness,
            message: format!("{} complement misses {} bytes", name, side.difference(&covered).count()),
        });
    }
}
