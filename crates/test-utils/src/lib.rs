//! Shared test utilities for the habitat overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic raster generators
//! - Temporary layer directories (GeoTIFFs + catalog CSV)
//! - Common test fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, LayerFixture};
//! ```

pub mod fixtures;
pub mod generators;
pub mod layers;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use layers::LayerFixture;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\
                 \n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of two Leaflet bounds pairs
/// `[[south, west], [north, east]]`.
///
/// ```ignore
/// use test_utils::assert_bounds_approx_eq;
///
/// assert_bounds_approx_eq!(result.bounds, [[56.0, 24.0], [58.0, 26.0]], 1e-9);
/// ```
#[macro_export]
macro_rules! assert_bounds_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: [[f64; 2]; 2] = $left;
        let right: [[f64; 2]; 2] = $right;
        for i in 0..2 {
            for j in 0..2 {
                $crate::assert_approx_eq!(left[i][j], right[i][j], $epsilon);
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_bounds_approx_eq_passes() {
        assert_bounds_approx_eq!(
            [[56.0, 24.0], [58.0, 26.0]],
            [[56.0, 24.0 + 1e-12], [58.0, 26.0]],
            1e-9
        );
    }
}
