//! One axis of a strided memory access.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One dimension of a strided access.
///
/// The touched positions along this axis are
/// `{ start + step * t : t in [0, trip_count) }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// Offset of the first access
    pub start: u64,
    /// Distance between consecutive accesses (positive)
    pub step: u64,
    /// Number of accesses along this axis (positive)
    pub trip_count: u64,
    /// Declared extent of this axis in the underlying array type
    pub dim_size: u64,
}

impl Dimension {
    /// Create a new dimension.
    pub fn new(start: u64, step: u64, trip_count: u64, dim_size: u64) -> Self {
        Self {
            start,
            step,
            trip_count,
            dim_size,
        }
    }

    /// A dense `[start, start + len)` range with unit step.
    pub fn dense(start: u64, len: u64, dim_size: u64) -> Self {
        Self::new(start, 1, len, dim_size)
    }

    /// Last touched position.
    pub fn end(&self) -> u64 {
        debug_assert!(self.checked_end().is_some(), "{} ends past u64::MAX", self);
        self.start + self.step * (self.trip_count - 1)
    }

    /// Last touched position, or `None` if it does not fit in `u64`.
    pub fn checked_end(&self) -> Option<u64> {
        self.step
            .checked_mul(self.trip_count.checked_sub(1)?)?
            .checked_add(self.start)
    }

    /// Check the `step > 0` and `trip_count > 0` invariants.
    pub fn is_well_formed(&self) -> bool {
        self.step > 0 && self.trip_count > 0
    }

    /// Check if `value` is one of the touched positions.
    pub fn contains(&self, value: u64) -> bool {
        value >= self.start
            && value <= self.end()
            && (value - self.start) % self.step == 0
    }

    /// Check if the closed spans `[start, end]` of two dimensions meet.
    pub fn spans_overlap(&self, other: &Dimension) -> bool {
        self.start <= other.end() && other.start <= self.end()
    }

    /// Iterate over the touched positions in increasing order.
    pub fn values(&self) -> impl Iterator<Item = u64> {
        let Dimension { start, step, .. } = *self;
        (0..self.trip_count).map(move |t| start + step * t)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} + {} * T, T in [0, {}), DimSize: {}",
            self.start, self.step, self.trip_count, self.dim_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_and_values() {
        let d = Dimension::new(3, 4, 5, 100);
        assert_eq!(d.end(), 19);
        assert_eq!(d.values().collect::<Vec<_>>(), vec![3, 7, 11, 15, 19]);
    }

    #[test]
    fn test_contains() {
        let d = Dimension::new(1, 2, 10, 100);
        assert!(d.contains(1));
        assert!(d.contains(19));
        assert!(!d.contains(2));
        assert!(!d.contains(21));
        assert!(!d.contains(0));
    }

    #[test]
    fn test_spans_overlap() {
        let a = Dimension::dense(0, 10, 100);
        let b = Dimension::dense(9, 5, 100);
        let c = Dimension::dense(10, 5, 100);
        assert!(a.spans_overlap(&b));
        assert!(!a.spans_overlap(&c));
    }

    #[test]
    fn test_display() {
        let d = Dimension::new(0, 2, 50, 100);
        assert_eq!(d.to_string(), "0 + 2 * T, T in [0, 50), DimSize: 100");
    }

    #[test]
    fn test_checked_end() {
        assert_eq!(Dimension::new(3, 4, 5, 100).checked_end(), Some(19));
        assert_eq!(Dimension::new(u64::MAX, 7, 1, 0).checked_end(), Some(u64::MAX));
        assert_eq!(Dimension::new(u64::MAX - 600, 1000, 2, 0).checked_end(), None);
        assert_eq!(Dimension::new(0, u64::MAX, 3, 0).checked_end(), None);
        assert_eq!(Dimension::new(0, 1, 0, 0).checked_end(), None);
    }

    #[test]
    fn test_well_formed() {
        assert!(Dimension::new(0, 1, 1, 0).is_well_formed());
        assert!(!Dimension::new(0, 0, 1, 0).is_well_formed());
        assert!(!Dimension::new(0, 1, 0, 0).is_well_formed());
    }
}
