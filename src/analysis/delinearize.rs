//! Recovering multi-dimensional structure from a flat byte range.
//!
//! A flat access `[lower, upper)` to an array that is elsewhere accessed
//! through subscripts can be compared dimension by dimension only if the byte
//! range maps onto a rectangular block of the array's index space. Two block
//! shapes are recognized:
//!
//! - whole rows: every dimension but the outermost is fully covered, the
//!   outermost may cover any contiguous sub-range;
//! - a single row segment: every dimension but the innermost is fixed to one
//!   index, the innermost covers a contiguous sub-range.

use crate::location::{Dimension, LocKind, MemoryLocationRange};
use log::debug;

/// Rewrite `what` as a collapsed sub-block of `from`'s index space.
///
/// Returns `what` unchanged when it does not describe such a block.
pub fn delinearize(from: &MemoryLocationRange, what: MemoryLocationRange) -> MemoryLocationRange {
    match try_delinearize(from, &what) {
        Some(loc) => loc,
        None => {
            debug!("cannot delinearize {} against {}", what, from);
            what
        }
    }
}

/// Rewrite `what` as a collapsed sub-block of `from`, if possible.
pub fn try_delinearize(from: &MemoryLocationRange, what: &MemoryLocationRange) -> Option<MemoryLocationRange> {
    if what.kind != LocKind::Default || from.kind != LocKind::Collapsed {
        return None;
    }
    let (lower, upper) = (what.lower_bound?, what.upper_bound?);
    if lower >= upper {
        return None;
    }
    let n = from.dims.len();
    if n == 0 {
        return None;
    }
    let strides = from.byte_strides()?;
    let elem_size = strides[n];
    if lower % elem_size != 0 || upper % elem_size != 0 {
        return None;
    }
    if strides[0] > 0 && upper > strides[0] {
        return None;
    }

    let index_of = |byte: u64| -> Vec<u64> {
        (0..n)
            .map(|i| {
                let (curr, next) = (strides[i], strides[i + 1]);
                if curr > 0 { (byte % curr) / next } else { byte / next }
            })
            .collect()
    };
    let lower_idx = index_of(lower);
    let upper_idx = index_of(upper - 1);

    let last = n - 1;
    let covers = |i: usize| lower_idx[i] == 0 && upper_idx[i] + 1 == from.dims[i].dim_size;
    let whole_rows = (1..n).all(covers);
    let segment = (0..last).all(|i| lower_idx[i] == upper_idx[i]);
    if !whole_rows && !segment {
        return None;
    }

    let dims = from
        .dims
        .iter()
        .enumerate()
        .map(|(i, dim)| Dimension {
            start: lower_idx[i],
            step: 1,
            trip_count: upper_idx[i] - lower_idx[i] + 1,
            dim_size: dim.dim_size,
        })
        .collect();
    Some(MemoryLocationRange::collapsed(what.ptr, elem_size, dims))
}
