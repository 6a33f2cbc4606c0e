//! Intersection and difference of memory location ranges.
//!
//! This is the kernel behind privatization and dependence classification:
//! given two footprints on the same base object it decides whether they
//! overlap, computes the overlap exactly when the shapes allow it, and
//! optionally splits each side into the part outside the overlap.
//!
//! The engine never fails. An input it cannot reason about precisely yields
//! [`Intersection::MayOverlap`] (or a [`LocKind::NonCollapsable`] complement),
//! and [`Intersection::Disjoint`] is only returned when no common element
//! exists.

use super::delinearize::delinearize;
use super::diophantine::intersect_progressions;
use super::difference::difference;
use crate::location::{LocKind, MemoryLocationRange};
use crate::utils::solution_print::SolutionPrinter;
use crate::EngineConfig;
use log::{debug, log_enabled, trace, Level};
use std::fmt;

/// Outcome of intersecting two memory location ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intersection {
    /// The footprints provably share no element.
    Disjoint,
    /// The footprints belong to different base objects and are not compared.
    Incomparable,
    /// The footprints may overlap; the common part could not be computed.
    MayOverlap,
    /// The exact common part.
    Exact(MemoryLocationRange),
}

impl Intersection {
    /// Check if the footprints are proven disjoint.
    pub fn is_disjoint(&self) -> bool {
        matches!(self, Intersection::Disjoint)
    }

    /// Check if a caller has to assume the footprints overlap.
    pub fn may_overlap(&self) -> bool {
        matches!(self, Intersection::MayOverlap | Intersection::Exact(_))
    }

    /// The exact common part, if known.
    pub fn location(&self) -> Option<&MemoryLocationRange> {
        match self {
            Intersection::Exact(loc) => Some(loc),
            _ => None,
        }
    }

    /// Get short name for the outcome.
    pub fn short_name(&self) -> &'static str {
        match self {
            Intersection::Disjoint => "disjoint",
            Intersection::Incomparable => "incomparable",
            Intersection::MayOverlap => "may-overlap",
            Intersection::Exact(_) => "exact",
        }
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intersection::Exact(loc) => write!(f, "exact {}", loc),
            other => write!(f, "{}", other.short_name()),
        }
    }
}

/// Leftover parts of both sides of an intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Complements {
    /// Parts of the left-hand side outside the intersection
    pub left: Vec<MemoryLocationRange>,
    /// Parts of the right-hand side outside the intersection
    pub right: Vec<MemoryLocationRange>,
}

impl Complements {
    /// Check if neither side has leftovers.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Intersect `lhs` with `rhs`.
///
/// If the result is [`Intersection::Exact`], the parts of `lhs` and `rhs`
/// outside of it are appended to `left` and `right` (when given). A side
/// whose leftover would need more than `threshold` gap progressions in some
/// dimension gets a single [`LocKind::NonCollapsable`] entry instead.
pub fn intersect(
    lhs: &MemoryLocationRange,
    rhs: &MemoryLocationRange,
    left: Option<&mut Vec<MemoryLocationRange>>,
    right: Option<&mut Vec<MemoryLocationRange>>,
    threshold: usize,
) -> Intersection {
    if lhs.ptr != rhs.ptr {
        return Intersection::Incomparable;
    }

    let (lhs, rhs) = match (lhs.kind, rhs.kind) {
        (LocKind::Default, LocKind::Collapsed) => (delinearize(rhs, lhs.clone()), rhs.clone()),
        (LocKind::Collapsed, LocKind::Default) => (lhs.clone(), delinearize(lhs, rhs.clone())),
        _ => (lhs.clone(), rhs.clone()),
    };

    match (lhs.is_collapsed(), rhs.is_collapsed()) {
        (false, false) => intersect_flat(&lhs, &rhs, left, right),
        (true, true) => intersect_collapsed(&lhs, &rhs, left, right, threshold),
        _ => {
            debug!("{} and {} have incompatible shapes", lhs, rhs);
            Intersection::MayOverlap
        }
    }
}

/// Intersect two locations neither of which is collapsed.
fn intersect_flat(
    lhs: &MemoryLocationRange,
    rhs: &MemoryLocationRange,
    left: Option<&mut Vec<MemoryLocationRange>>,
    right: Option<&mut Vec<MemoryLocationRange>>,
) -> Intersection {
    let bounds = |loc: &MemoryLocationRange| match loc.kind {
        LocKind::Default => (loc.lower_bound, loc.upper_bound),
        _ => (None, None),
    };
    let (lhs_lower, lhs_upper) = bounds(lhs);
    let (rhs_lower, rhs_upper) = bounds(rhs);

    let (Some(l_lo), Some(l_hi), Some(r_lo), Some(r_hi)) = (lhs_lower, lhs_upper, rhs_lower, rhs_upper) else {
        let below = matches!((lhs_upper, rhs_lower), (Some(hi), Some(lo)) if hi <= lo);
        let above = matches!((lhs_lower, rhs_upper), (Some(lo), Some(hi)) if lo >= hi);
        return if below || above {
            Intersection::Disjoint
        } else {
            Intersection::MayOverlap
        };
    };

    // Ranges that only touch share nothing. An empty side strictly inside
    // the other still yields an empty exact range.
    if l_hi <= r_lo || l_lo >= r_hi {
        return Intersection::Disjoint;
    }

    let mut int = lhs.clone();
    let (lo, hi) = (l_lo.max(r_lo), l_hi.min(r_hi));
    int.lower_bound = Some(lo);
    int.upper_bound = Some(hi);

    let remainders = |side: &MemoryLocationRange, side_lo: u64, side_hi: u64| {
        let mut parts = Vec::new();
        if side_lo < lo {
            parts.push(MemoryLocationRange::flat(side.ptr, side_lo, lo));
        }
        if side_hi > hi {
            parts.push(MemoryLocationRange::flat(side.ptr, hi, side_hi));
        }
        parts
    };
    if let Some(left) = left {
        left.extend(remainders(lhs, l_lo, l_hi));
    }
    if let Some(right) = right {
        right.extend(remainders(rhs, r_lo, r_hi));
    }
    Intersection::Exact(int)
}

/// Intersect two collapsed locations dimension by dimension.
fn intersect_collapsed(
    lhs: &MemoryLocationRange,
    rhs: &MemoryLocationRange,
    left: Option<&mut Vec<MemoryLocationRange>>,
    right: Option<&mut Vec<MemoryLocationRange>>,
    threshold: usize,
) -> Intersection {
    if lhs.rank() != rhs.rank() {
        debug!("{} and {} differ in rank", lhs, rhs);
        return Intersection::MayOverlap;
    }
    if lhs.element_size() != rhs.element_size() {
        debug!("{} and {} differ in element size", lhs, rhs);
        return Intersection::MayOverlap;
    }
    // Index spaces are only comparable if every axis has the same extent.
    if let Some(i) = lhs.dims.iter().zip(&rhs.dims).position(|(l, r)| l.dim_size != r.dim_size) {
        debug!(
            "dimension {} differs in size: {} vs {}",
            i, lhs.dims[i].dim_size, rhs.dims[i].dim_size
        );
        return Intersection::MayOverlap;
    }
    if lhs == rhs {
        return Intersection::Exact(lhs.clone());
    }

    let mut int = lhs.clone();
    for (i, (l, r)) in lhs.dims.iter().zip(&rhs.dims).enumerate() {
        if !l.spans_overlap(r) {
            return Intersection::Disjoint;
        }
        match intersect_progressions(l, r) {
            Some(dim) => int.dims[i] = dim,
            None => return Intersection::Disjoint,
        }
    }

    if let Some(left) = left {
        left.extend(complement(lhs, &int, threshold));
    }
    if let Some(right) = right {
        right.extend(complement(rhs, &int, threshold));
    }
    Intersection::Exact(int)
}

/// Split `side \ int` into disjoint collapsed pieces.
///
/// Piece `k` of dimension `i` takes dimensions `0..i` from `int`, the `k`-th
/// leftover of dimension `i`, and dimensions `i + 1..` from `side`.
fn complement(
    side: &MemoryLocationRange,
    int: &MemoryLocationRange,
    threshold: usize,
) -> Vec<MemoryLocationRange> {
    let mut pieces = Vec::new();
    let mut prefix = side.clone();
    for (i, (d, sub)) in side.dims.iter().zip(&int.dims).enumerate() {
        match difference(d, sub, threshold) {
            Ok(leftovers) => {
                pieces.extend(leftovers.into_iter().map(|dim| prefix.with_dim(i, dim)));
            }
            Err(err) => {
                debug!("complement of {} in dimension {}: {}", side, i, err);
                return vec![side.clone().into_non_collapsable()];
            }
        }
        prefix.dims[i] = *sub;
    }
    pieces
}

/// Intersection engine with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct RangeEngine {
    /// Engine settings
    pub config: EngineConfig,
}

impl RangeEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given settings.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Intersect two locations, discarding complements.
    pub fn intersect(&self, lhs: &MemoryLocationRange, rhs: &MemoryLocationRange) -> Intersection {
        intersect(lhs, rhs, None, None, self.config.threshold)
    }

    /// Intersect two locations and compute the leftovers on both sides.
    ///
    /// Complements are left empty if `compute_complements` is off.
    pub fn intersect_with_complements(
        &self,
        lhs: &MemoryLocationRange,
        rhs: &MemoryLocationRange,
    ) -> (Intersection, Complements) {
        let mut complements = Complements::default();
        let result = if self.config.compute_complements {
            intersect(
                lhs,
                rhs,
                Some(&mut complements.left),
                Some(&mut complements.right),
                self.config.threshold,
            )
        } else {
            self.intersect(lhs, rhs)
        };

        if self.config.trace && log_enabled!(Level::Trace) {
            if let Intersection::Exact(int) = &result {
                let mut printer = SolutionPrinter::new();
                printer.print_solution(
                    int,
                    Some(complements.left.as_slice()),
                    Some(complements.right.as_slice()),
                );
                trace!("{}", printer.output());
            }
        }
        (result, complements)
    }
}
