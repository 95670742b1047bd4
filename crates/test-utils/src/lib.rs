//! Shared test utilities for the density-tiles workspace.
//!
//! - Seeded point and box generators ([`generators`])
//! - Well-known boxes and a temporary CSV dataset writer ([`fixtures`])
//! - Approximate float assertions for projected coordinates
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Assert two floats differ by at most `tol`.
///
/// ```ignore
/// assert_approx_eq!(bbox.max_x, ORIGIN_SHIFT, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (actual, expected, tol) = ($actual as f64, $expected as f64, $tol as f64);
        assert!(
            (actual - expected).abs() <= tol,
            "{} = {} is not within {} of {}",
            stringify!($actual),
            actual,
            tol,
            expected
        );
    }};
}

/// Assert each of `min_x`, `min_y`, `max_x`, `max_y` of two boxes are within
/// `tol` of each other. Works for any type with those fields.
#[macro_export]
macro_rules! assert_bounds_approx_eq {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (a, e) = (&$actual, &$expected);
        $crate::assert_approx_eq!(a.min_x, e.min_x, $tol);
        $crate::assert_approx_eq!(a.min_y, e.min_y, $tol);
        $crate::assert_approx_eq!(a.max_x, e.max_x, $tol);
        $crate::assert_approx_eq!(a.max_y, e.max_y, $tol);
    }};
}

#[cfg(test)]
mod tests {
    struct Bounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    }

    #[test]
    fn test_assert_approx_eq_within_tolerance() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
        assert_approx_eq!(3u32, 3.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_assert_approx_eq_outside_tolerance() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_bounds_approx_eq() {
        let a = Bounds { min_x: 0.0, min_y: 1.0, max_x: 2.0, max_y: 3.0 };
        let b = Bounds { min_x: 1e-9, min_y: 1.0, max_x: 2.0, max_y: 3.0 - 1e-9 };
        assert_bounds_approx_eq!(a, b, 1e-6);
    }
}
