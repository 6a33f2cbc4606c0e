//! Common values of two bounded arithmetic progressions.
//!
//! Two progressions `L1 + K1*x`, `x in [0, X]` and `L2 + K2*y`, `y in [0, Y]`
//! share a value exactly when the linear Diophantine equation
//! `K1*x - K2*y = L2 - L1` has a solution inside both index ranges. The
//! general solution is a line `x = A + B*t`, `y = C + D*t`; clipping `t` to
//! the four bound inequalities yields the common values, which again form an
//! arithmetic progression with step `lcm(K1, K2)`.
//!
//! All intermediate arithmetic is done in `i128`, so any `u64` inputs are
//! handled without overflow.

use crate::location::Dimension;
use num_integer::Integer;

/// Extended GCD: returns (gcd, x, y) such that a*x + b*y = gcd.
pub fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    if b == 0 {
        (a.abs(), a.signum(), 0)
    } else {
        let (g, x, y) = extended_gcd(b, a % b);
        (g, y, x - (a / b) * y)
    }
}

/// Solve linear Diophantine equation: a*x + b*y = c.
pub fn solve_diophantine(a: i128, b: i128, c: i128) -> Option<(i128, i128)> {
    if a == 0 && b == 0 {
        return if c == 0 { Some((0, 0)) } else { None };
    }

    let (g, x0, y0) = extended_gcd(a, b);

    if c % g != 0 {
        return None;
    }

    let scale = c / g;
    Some((x0 * scale, y0 * scale))
}

/// Largest integer not greater than `n / d`.
pub fn floor_div(n: i128, d: i128) -> i128 {
    Integer::div_floor(&n, &d)
}

/// Smallest integer not less than `n / d`.
pub fn ceil_div(n: i128, d: i128) -> i128 {
    -Integer::div_floor(&-n, &d)
}

/// Parametric solution `x = x0 + x_step*t`, `y = y0 + y_step*t` of
/// `k1*x - k2*y = rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearSolution {
    /// A
    pub x0: i128,
    /// B = k2 / gcd(k1, k2)
    pub x_step: i128,
    /// C
    pub y0: i128,
    /// D = k1 / gcd(k1, k2)
    pub y_step: i128,
}

impl LinearSolution {
    /// Evaluate the solution at parameter `t`.
    pub fn at(&self, t: i128) -> (i128, i128) {
        (self.x0 + self.x_step * t, self.y0 + self.y_step * t)
    }
}

/// Solve `k1*x - k2*y = rhs` for strictly positive `k1` and `k2`.
///
/// The particular solution is normalized so that `0 <= x0 < x_step`.
pub fn solve_two_variable(k1: i128, k2: i128, rhs: i128) -> Option<LinearSolution> {
    debug_assert!(k1 > 0 && k2 > 0, "coefficients must be positive");
    let (x, y) = solve_diophantine(k1, -k2, rhs)?;
    let g = num_integer::gcd(k1, k2);
    let x_step = k2 / g;
    let y_step = k1 / g;

    let shift = floor_div(x, x_step);
    Some(LinearSolution {
        x0: x - x_step * shift,
        x_step,
        y0: y - y_step * shift,
        y_step,
    })
}

/// Compute the progression of values touched by both `lhs` and `rhs`.
///
/// Returns `None` if the two progressions have no value in common. The
/// result takes its `dim_size` from `lhs`.
pub fn intersect_progressions(lhs: &Dimension, rhs: &Dimension) -> Option<Dimension> {
    debug_assert!(lhs.is_well_formed() && rhs.is_well_formed(), "malformed dimension");
    let (l1, k1) = (lhs.start as i128, lhs.step as i128);
    let (l2, k2) = (rhs.start as i128, rhs.step as i128);
    let x_max = lhs.trip_count as i128 - 1;
    let y_max = rhs.trip_count as i128 - 1;

    let solution = solve_two_variable(k1, k2, l2 - l1)?;
    let LinearSolution { x0: a, x_step: b, y0: c, y_step: d } = solution;

    let t_min = ceil_div(-a, b).max(ceil_div(-c, d));
    let t_max = floor_div(x_max - a, b).min(floor_div(y_max - c, d));
    if t_max < t_min {
        return None;
    }

    let step = k1 * b;
    let start = k1 * a + l1 + step * t_min;
    let trip_count = t_max - t_min + 1;
    debug_assert!(start >= l1 && start <= l1 + k1 * x_max);

    Some(Dimension {
        start: narrow(start),
        // Only a one-element progression can have an lcm beyond u64.
        step: narrow(step),
        trip_count: narrow(trip_count),
        dim_size: lhs.dim_size,
    })
}

fn narrow(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enumerate_common(a: &Dimension, b: &Dimension) -> Vec<u64> {
        a.values().filter(|v| b.contains(*v)).collect()
    }

    #[test]
    fn test_extended_gcd() {
        let (g, x, y) = extended_gcd(12, 8);
        assert_eq!(g, 4);
        assert_eq!(12 * x + 8 * y, 4);

        let (g, x, y) = extended_gcd(6, -4);
        assert_eq!(g, 2);
        assert_eq!(6 * x - 4 * y, 2);
    }

    #[test]
    fn test_solve_diophantine() {
        let (x, y) = solve_diophantine(3, 5, 1).unwrap();
        assert_eq!(3 * x + 5 * y, 1);
        assert!(solve_diophantine(2, 4, 3).is_none());
        assert_eq!(solve_diophantine(0, 0, 0), Some((0, 0)));
        assert!(solve_diophantine(0, 0, 1).is_none());
    }

    #[test]
    fn test_floor_ceil_all_signs() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(ceil_div(-7, 2), -3);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(ceil_div(7, -2), -3);
        // Both negative: the quotient is positive and rounds like 7 / 2.
        assert_eq!(floor_div(-7, -2), 3);
        assert_eq!(ceil_div(-7, -2), 4);
        assert_eq!(floor_div(-6, -2), 3);
        assert_eq!(ceil_div(-6, -2), 3);
        assert_eq!(floor_div(0, -5), 0);
        assert_eq!(ceil_div(0, 5), 0);
    }

    #[test]
    fn test_solve_two_variable_is_normalized() {
        let sol = solve_two_variable(4, 6, 10).unwrap();
        assert_eq!(sol.x_step, 3);
        assert_eq!(sol.y_step, 2);
        assert!(sol.x0 >= 0 && sol.x0 < sol.x_step);
        for t in -3..3 {
            let (x, y) = sol.at(t);
            assert_eq!(4 * x - 6 * y, 10);
        }
        assert!(solve_two_variable(4, 6, 3).is_none());
    }

    #[test]
    fn test_even_indices_within_dense() {
        let dense = Dimension::new(0, 1, 100, 100);
        let even = Dimension::new(0, 2, 50, 100);
        assert_eq!(intersect_progressions(&dense, &even), Some(even));
        assert_eq!(intersect_progressions(&even, &dense), Some(even));
    }

    #[test]
    fn test_even_and_odd_are_disjoint() {
        let even = Dimension::new(0, 2, 10, 100);
        let odd = Dimension::new(1, 2, 10, 100);
        assert_eq!(intersect_progressions(&even, &odd), None);
    }

    #[test]
    fn test_solvable_but_out_of_range() {
        // 0, 4, 8, 12 and 6, 9: the first common value would be 12.
        let a = Dimension::new(0, 4, 4, 100);
        let b = Dimension::new(6, 3, 2, 100);
        assert!(a.spans_overlap(&b));
        assert!(solve_two_variable(4, 3, 6).is_some());
        assert_eq!(intersect_progressions(&a, &b), None);
    }

    #[test]
    fn test_lcm_step() {
        let a = Dimension::new(2, 4, 20, 100);
        let b = Dimension::new(5, 3, 20, 100);
        let int = intersect_progressions(&a, &b).unwrap();
        assert_eq!(int.step, 12);
        assert_eq!(int.values().collect::<Vec<_>>(), enumerate_common(&a, &b));
    }

    #[test]
    fn test_matches_enumeration_on_small_inputs() {
        for s1 in 0..5 {
            for k1 in 1..5 {
                for n1 in 1..6 {
                    for s2 in 0..5 {
                        for k2 in 1..5 {
                            let n2 = 7 - n1;
                            let a = Dimension::new(s1, k1, n1, 64);
                            let b = Dimension::new(s2, k2, n2, 64);
                            let expected = enumerate_common(&a, &b);
                            match intersect_progressions(&a, &b) {
                                None => assert!(expected.is_empty(), "{} vs {}", a, b),
                                Some(int) => {
                                    let got: Vec<u64> = int.values().collect();
                                    assert_eq!(got, expected, "{} vs {}", a, b);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_coprime_steps() {
        let k1 = (1u64 << 40) + 1;
        let k2 = (1u64 << 40) - 1;
        let a = Dimension::new(0, k1, 3, 0);
        let b = Dimension::new(0, k2, 3, 0);
        let int = intersect_progressions(&a, &b).unwrap();
        assert_eq!(int.start, 0);
        assert_eq!(int.trip_count, 1);
    }
}
