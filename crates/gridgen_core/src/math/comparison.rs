//! Floating-point comparison helpers used by the refinement criteria.
//!
//! All helpers are generic over `T: Float` so they can be used with both
//! `f64` and `f32` grids.

use num_traits::Float;

/// Relative error between two values.
///
/// Returns `|a - b| / max(|a|, |b|)` when either value is nonzero and
/// `max(|a|, |b|)` (i.e. zero) when both are zero, so two exact zeros are
/// always considered identical.
///
/// # Example
///
/// ```
/// use gridgen_core::math::comparison::relative_error;
///
/// assert_eq!(relative_error(1.0, 1.0), 0.0);
/// assert_eq!(relative_error(0.0, 0.0), 0.0);
/// assert!((relative_error(100.0_f64, 99.0) - 0.01).abs() < 1e-15);
/// ```
#[inline]
pub fn relative_error<T: Float>(a: T, b: T) -> T {
    let scale = a.abs().max(b.abs());

    if a != T::zero() || b != T::zero() {
        (a - b).abs() / scale
    } else {
        scale
    }
}

/// Absolute distance between two values.
#[inline]
pub fn absolute_difference<T: Float>(a: T, b: T) -> T {
    (a - b).abs()
}

/// Lower bound of `value` widened by the relative fuzz `tol`.
///
/// Used to accept values that undershoot a limit by rounding only.
#[inline]
pub fn fuzzy_lower_bound<T: Float>(value: T, tol: T) -> T {
    if value > T::zero() {
        value * (T::one() - tol)
    } else if value < T::zero() {
        value * (T::one() + tol)
    } else {
        -tol
    }
}

/// Upper bound of `value` widened by the relative fuzz `tol`.
#[inline]
pub fn fuzzy_upper_bound<T: Float>(value: T, tol: T) -> T {
    if value > T::zero() {
        value * (T::one() + tol)
    } else if value < T::zero() {
        value * (T::one() - tol)
    } else {
        tol
    }
}
