//! Subtracting a sub-progression from a progression.

use crate::location::Dimension;
use smallvec::SmallVec;
use thiserror::Error;

/// Leftover pieces of a single dimension.
pub type Pieces = SmallVec<[Dimension; 3]>;

/// Subtracting would produce more gap progressions than allowed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{repeats} gap progressions exceed the threshold of {threshold}")]
pub struct ThresholdExceeded {
    /// Number of gap progressions the difference needs
    pub repeats: u64,
    /// Caller-supplied budget
    pub threshold: usize,
}

/// Compute `values(d) \ values(i)` where `i` is a subset of `d`.
///
/// The result is made of up to three kinds of progressions: the values of `d`
/// before `i.start`, the values after the last value of `i`, and, between
/// consecutive values of `i`, one progression per skipped `d` lattice
/// position (`i.step / d.step - 1` of them, each with step `i.step`). Pieces
/// that continue each other are merged. The pieces are pairwise disjoint and
/// together with `i` cover `d` exactly.
pub fn difference(d: &Dimension, i: &Dimension, threshold: usize) -> Result<Pieces, ThresholdExceeded> {
    debug_assert!(d.is_well_formed() && i.is_well_formed(), "malformed dimension");
    debug_assert!(
        d.contains(i.start) && d.contains(i.end()) && (i.trip_count == 1 || i.step % d.step == 0),
        "{} is not a subset of {}",
        i,
        d
    );

    let repeats = if i.trip_count > 1 { i.step / d.step - 1 } else { 0 };
    if repeats > threshold as u64 {
        return Err(ThresholdExceeded { repeats, threshold });
    }

    let mut pieces = Pieces::new();
    if d.start < i.start {
        pieces.push(Dimension {
            start: d.start,
            step: d.step,
            trip_count: (i.start - d.start) / d.step,
            dim_size: d.dim_size,
        });
    }
    for j in 1..=repeats {
        pieces.push(Dimension {
            start: i.start + d.step * j,
            step: i.step,
            trip_count: i.trip_count - 1,
            dim_size: d.dim_size,
        });
    }
    let (d_end, i_end) = (d.end(), i.end());
    if d_end > i_end {
        pieces.push(Dimension {
            start: i_end + d.step,
            step: d.step,
            trip_count: (d_end - i_end) / d.step,
            dim_size: d.dim_size,
        });
    }
    Ok(coalesce(pieces))
}

/// Merge pieces that continue each other into a single progression.
fn coalesce(mut pieces: Pieces) -> Pieces {
    if pieces.len() < 2 {
        return pieces;
    }
    pieces.sort_unstable_by_key(|p| p.start);
    let mut merged = Pieces::new();
    for piece in pieces {
        if let Some(last) = merged.last_mut() {
            if let Some(joined) = join(last, &piece) {
                *last = joined;
                continue;
            }
        }
        merged.push(piece);
    }
    merged
}

/// Append `next` to `prev` if the two form one progression.
fn join(prev: &Dimension, next: &Dimension) -> Option<Dimension> {
    let prev_end = prev.end();
    if next.start <= prev_end {
        return None;
    }
    let step = if prev.trip_count > 1 {
        prev.step
    } else if next.trip_count > 1 {
        next.step
    } else {
        next.start - prev.start
    };
    let fits = next.start - prev_end == step && (next.trip_count == 1 || next.step == step);
    fits.then(|| Dimension {
        start: prev.start,
        step,
        trip_count: prev.trip_count + next.trip_count,
        dim_size: prev.dim_size,
    })
}
