//! Human-readable dumps of intersection results.
//!
//! Used for debugging only; nothing in the engine depends on the output.

use crate::location::{Dimension, LocKind, MemoryLocationRange};

/// Printer for intersection solutions.
pub struct SolutionPrinter {
    /// Output buffer
    buffer: String,
}

impl SolutionPrinter {
    /// Create a new printer.
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Get the output.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the output.
    pub fn take_output(self) -> String {
        self.buffer
    }

    /// Print a single range as `{Kind | dims...}`.
    pub fn print_range(&mut self, range: &MemoryLocationRange) {
        self.buffer.push('{');
        match range.kind {
            LocKind::Default => {
                self.buffer.push_str("Flat | ");
                self.buffer.push_str(&bound(range.lower_bound));
                self.buffer.push_str(", ");
                self.buffer.push_str(&bound(range.upper_bound));
            }
            LocKind::Collapsed => {
                self.buffer.push_str("Full |");
                for dim in &range.dims {
                    self.buffer.push(' ');
                    self.buffer.push_str(&dim.to_string());
                    self.buffer.push(';');
                }
            }
            LocKind::NonCollapsable => self.buffer.push_str("NonCollapsable"),
        }
        self.buffer.push_str("} ");
    }

    /// Print an intersection together with both complements.
    pub fn print_solution(
        &mut self,
        int: &MemoryLocationRange,
        left: Option<&[MemoryLocationRange]>,
        right: Option<&[MemoryLocationRange]>,
    ) {
        self.buffer.push_str("[EQUATION] Solution:\n");
        self.buffer.push_str("Left: ");
        for range in left.unwrap_or_default() {
            self.print_range(range);
        }
        self.buffer.push_str("\nIntersection: ");
        self.print_range(int);
        self.buffer.push_str("\nRight: ");
        for range in right.unwrap_or_default() {
            self.print_range(range);
        }
        self.buffer.push_str("\n[EQUATION] Solution has been printed.\n");
    }
}

impl Default for SolutionPrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn bound(value: Option<u64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Print an intersection and its complements to a string.
pub fn print_solution(
    int: &MemoryLocationRange,
    left: &[MemoryLocationRange],
    right: &[MemoryLocationRange],
) -> String {
    let mut printer = SolutionPrinter::new();
    printer.print_solution(int, Some(left), Some(right));
    printer.take_output()
}

/// ASCII strip of the positions `[0, extent)` touched by a dimension.
pub fn visualize_1d(dim: &Dimension, extent: u64) -> String {
    (0..extent)
        .map(|v| if dim.contains(v) { '*' } else { '.' })
        .collect()
}
