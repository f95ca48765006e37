//! Bracketed interpolation on tabulated grids.

use super::policy::InterpolationPolicy;
use crate::math::comparison::relative_error;
use crate::types::InterpolationError;
use num_traits::Float;

/// Relative fuzz used to snap values that overshoot a grid limit by
/// rounding only.
pub const GRID_FUZZ: f64 = 1e-3;

/// Validate a tabulated grid.
///
/// Requires at least 2 points, matching lengths, and non-decreasing
/// abscissae.
///
/// # Example
///
/// ```
/// use gridgen_core::math::interpolation::validate_grid;
///
/// assert!(validate_grid(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).is_ok());
/// assert!(validate_grid(&[0.0], &[1.0]).is_err());
/// assert!(validate_grid(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
/// ```
pub fn validate_grid<T: Float>(xs: &[T], ys: &[T]) -> Result<(), InterpolationError> {
    check_table_shape(xs, ys)?;

    match xs.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(InterpolationError::NonMonotonicData { index: i + 1 }),
        None => Ok(()),
    }
}

/// Find the segment index `i` such that `xs[i] <= x < xs[i+1]`,
/// clamped to the valid segment range `[0, n-2]`.
#[inline]
pub fn find_segment<T: Float>(xs: &[T], x: T) -> usize {
    let pos = xs.partition_point(|&xi| xi <= x);

    if pos == 0 {
        0
    } else if pos >= xs.len() {
        xs.len() - 2
    } else {
        pos - 1
    }
}

/// Interpolate on a tabulated grid and return the processed dependent value.
///
/// The query is bracketed with a binary search and interpolated with `P`.
/// A query equal to the last node, or above it by no more than
/// [`GRID_FUZZ`] in relative terms, returns the processed last value.
///
/// # Errors
///
/// * [`InterpolationError::InsufficientData`] - fewer than 2 grid points
/// * [`InterpolationError::InvalidInput`] - `xs` and `ys` differ in length
/// * [`InterpolationError::OutOfBounds`] - `x` lies outside the grid
/// * [`InterpolationError::Domain`] - a value is outside the policy domain
///
/// Ordering of the abscissae is not checked (see [`validate_grid`]).
pub fn interpolate_and_process_on_grid<P, T>(x: T, xs: &[T], ys: &[T]) -> Result<T, InterpolationError>
where
    P: InterpolationPolicy,
    T: Float,
{
    check_table_shape(xs, ys)?;

    let n = xs.len();
    let x_min = xs[0];
    let x_max = xs[n - 1];

    if x < x_max {
        if x < x_min {
            return Err(out_of_bounds(x, x_min, x_max));
        }

        let i = find_segment(xs, x);
        P::interpolate_and_process(xs[i], xs[i + 1], x, ys[i], ys[i + 1])
    } else if x == x_max {
        P::process_dep(ys[n - 1])
    } else {
        let fuzz = T::from(GRID_FUZZ).unwrap_or_else(T::epsilon);

        if relative_error(x, x_max) <= fuzz {
            P::process_dep(ys[n - 1])
        } else {
            Err(out_of_bounds(x, x_min, x_max))
        }
    }
}

/// Interpolate on a tabulated grid and return the recovered value.
///
/// See [`interpolate_and_process_on_grid`].
///
/// # Example
///
/// ```
/// use gridgen_core::math::interpolation::{interpolate_on_grid, LinLin};
///
/// let xs = [0.0, 1.0, 2.0];
/// let ys = [0.0, 1.0, 4.0];
/// let y = interpolate_on_grid::<LinLin, f64>(1.5, &xs, &ys).unwrap();
/// assert!((y - 2.5).abs() < 1e-12);
/// ```
#[inline]
pub fn interpolate_on_grid<P, T>(x: T, xs: &[T], ys: &[T]) -> Result<T, InterpolationError>
where
    P: InterpolationPolicy,
    T: Float,
{
    interpolate_and_process_on_grid::<P, T>(x, xs, ys).map(|p| P::recover_dep(p))
}

/// Length checks of [`validate_grid`], without the ordering scan.
#[inline]
pub(crate) fn check_table_shape<T>(xs: &[T], ys: &[T]) -> Result<(), InterpolationError> {
    if xs.len() != ys.len() {
        return Err(InterpolationError::InvalidInput(format!(
            "xs and ys must have same length: got {} and {}",
            xs.len(),
            ys.len()
        )));
    }

    if xs.len() < 2 {
        return Err(InterpolationError::InsufficientData {
            got: xs.len(),
            need: 2,
        });
    }

    Ok(())
}

fn out_of_bounds<T: Float>(x: T, min: T, max: T) -> InterpolationError {
    InterpolationError::OutOfBounds {
        x: x.to_f64().unwrap_or(f64::NAN),
        min: min.to_f64().unwrap_or(f64::NAN),
        max: max.to_f64().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::interpolation::{LinLin, LogLog};
    use approx::assert_relative_eq;

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn test_validate_mismatched_lengths() {
        match validate_grid(&[0.0, 1.0, 2.0], &[0.0, 1.0]).unwrap_err() {
            InterpolationError::InvalidInput(msg) => assert!(msg.contains("same length")),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_insufficient_data() {
        let xs: [f64; 0] = [];
        assert_eq!(
            validate_grid(&xs, &xs).unwrap_err(),
            InterpolationError::InsufficientData { got: 0, need: 2 }
        );
    }

    #[test]
    fn test_validate_reports_first_descending_index() {
        assert_eq!(
            validate_grid(&[0.0, 1.0, 3.0, 2.0], &[0.0; 4]).unwrap_err(),
            InterpolationError::NonMonotonicData { index: 3 }
        );
    }

    // ========================================
    // Segment search
    // ========================================

    #[test]
    fn test_find_segment_clamps() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_segment(&xs, -1.0), 0);
        assert_eq!(find_segment(&xs, 0.0), 0);
        assert_eq!(find_segment(&xs, 1.0), 1);
        assert_eq!(find_segment(&xs, 2.5), 2);
        assert_eq!(find_segment(&xs, 3.0), 2);
        assert_eq!(find_segment(&xs, 10.0), 2);
    }

    // ========================================
    // Interpolation
    // ========================================

    #[test]
    fn test_interpolate_at_knots() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 2.0, 4.0, 6.0];
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_eq!(interpolate_on_grid::<LinLin, f64>(x, &xs, &ys).unwrap(), y);
        }
    }

    #[test]
    fn test_interpolate_midpoints() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];
        assert_relative_eq!(interpolate_on_grid::<LinLin, f64>(0.5, &xs, &ys).unwrap(), 0.5);
        assert_relative_eq!(interpolate_on_grid::<LinLin, f64>(1.5, &xs, &ys).unwrap(), 2.5);
    }

    #[test]
    fn test_processed_value_is_log_for_log_dep() {
        let xs = [1.0, 10.0];
        let ys = [1.0, 100.0];
        let p = interpolate_and_process_on_grid::<LogLog, f64>(10.0, &xs, &ys).unwrap();
        assert_relative_eq!(p, 100.0_f64.ln());
    }

    #[test]
    fn test_snaps_within_fuzz_above_last_node() {
        let xs = [0.0, 1.0];
        let ys = [3.0, 7.0];
        let y = interpolate_on_grid::<LinLin, f64>(1.0 + 1e-6, &xs, &ys).unwrap();
        assert_eq!(y, 7.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];

        match interpolate_on_grid::<LinLin, f64>(-0.1, &xs, &ys).unwrap_err() {
            InterpolationError::OutOfBounds { x, min, max } => {
                assert_relative_eq!(x, -0.1);
                assert_eq!(min, 0.0);
                assert_eq!(max, 2.0);
            }
            other => panic!("Expected OutOfBounds error, got {:?}", other),
        }

        assert!(interpolate_on_grid::<LinLin, f64>(2.1, &xs, &ys).is_err());
    }

    #[test]
    fn test_malformed_tables_are_rejected() {
        let empty: [f64; 0] = [];
        assert_eq!(
            interpolate_on_grid::<LinLin, f64>(0.0, &empty, &empty).unwrap_err(),
            InterpolationError::InsufficientData { got: 0, need: 2 }
        );
        assert_eq!(
            interpolate_on_grid::<LinLin, f64>(0.0, &[0.0], &[1.0]).unwrap_err(),
            InterpolationError::InsufficientData { got: 1, need: 2 }
        );

        match interpolate_on_grid::<LinLin, f64>(0.5, &[0.0, 1.0], &[1.0]).unwrap_err() {
            InterpolationError::InvalidInput(msg) => assert!(msg.contains("same length")),
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }
}
