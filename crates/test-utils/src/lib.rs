//! Helpers shared by the netcdf-generator test suites.
//!
//! - [`assert_approx_eq!`] and [`assert_axis_approx_eq!`] compare floats read
//!   back from a container
//! - [`generators`] builds axes and cell values that expose misplaced cells
//! - [`fixtures`] holds grids, depth sets and dates
//! - [`paths`] hands out scratch files
//!
//! Pull it in as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Panics unless `|left - right| <= epsilon`, comparing as `f64`.
///
/// NaN on either side always fails.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(-17.750_001_f32, -17.75, 1e-5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > `{:?}`",
            left,
            right,
            diff,
            epsilon
        );
    }};
}

/// [`assert_approx_eq!`] applied pairwise to two axes of equal length.
///
/// ```
/// use test_utils::assert_axis_approx_eq;
///
/// let lat = vec![-28.0_f32, -26.542_857];
/// assert_axis_approx_eq!(&lat, &[-28.0_f32, -26.542_86], 1e-4);
/// ```
#[macro_export]
macro_rules! assert_axis_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right) = ($left, $right);
        assert_eq!(left.len(), right.len(), "axis lengths differ");
        for (l, r) in left.iter().zip(right.iter()) {
            $crate::assert_approx_eq!(*l, *r, $epsilon);
        }
    }};
}

/// Indices of the NaN cells of a dense buffer.
pub fn nan_positions(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.is_nan().then_some(i))
        .collect()
}
