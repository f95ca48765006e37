//! Processing spaces for independent and dependent variables.
//!
//! A processing space maps a raw value into the space in which an
//! interpolation policy is linear. [`Lin`] is the identity map and [`Log`]
//! is the natural logarithm.

use crate::types::InterpolationError;
use num_traits::Float;
use std::fmt;

/// A value transform into (and out of) an interpolation-linear space.
///
/// Implementors are zero-sized marker types; every operation is an
/// associated function so that policies built on top of them are resolved
/// statically.
pub trait ProcessingSpace: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Human-readable name used in diagnostics.
    const NAME: &'static str;

    /// Map a raw value into the processed space.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::Domain`] if the value is outside the
    /// domain of the space.
    fn process<T: Float>(value: T) -> Result<T, InterpolationError>;

    /// Map a processed value back to the raw space (exact inverse of `process`).
    fn recover<T: Float>(processed: T) -> T;

    /// Returns `true` if `value` can be processed.
    fn is_valid<T: Float>(value: T) -> bool;
}

/// Linear (identity) processing space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Lin;

/// Logarithmic processing space (natural log).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Log;

impl ProcessingSpace for Lin {
    const NAME: &'static str = "linear";

    #[inline]
    fn process<T: Float>(value: T) -> Result<T, InterpolationError> {
        Ok(value)
    }

    #[inline]
    fn recover<T: Float>(processed: T) -> T {
        processed
    }

    #[inline]
    fn is_valid<T: Float>(_value: T) -> bool {
        true
    }
}

impl ProcessingSpace for Log {
    const NAME: &'static str = "logarithmic";

    #[inline]
    fn process<T: Float>(value: T) -> Result<T, InterpolationError> {
        if Self::is_valid(value) {
            Ok(value.ln())
        } else {
            Err(InterpolationError::domain(
                value.to_f64().unwrap_or(f64::NAN),
                Self::NAME,
            ))
        }
    }

    #[inline]
    fn recover<T: Float>(processed: T) -> T {
        processed.exp()
    }

    #[inline]
    fn is_valid<T: Float>(value: T) -> bool {
        value > T::zero()
    }
}

/// Interpolate `y(x)` between two points in the given processing spaces.
///
/// The dependent values are processed with `D`, the independent values
/// with `I`, a straight line is drawn in the processed plane and the result
/// is recovered with `D`. Used for the auxiliary interpolations of
/// unit-base grids (grid limits and grid lengths), where the combination
/// of spaces is derived from a 2D policy rather than named explicitly.
#[inline]
pub fn interpolate_in_spaces<D, I, T>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError>
where
    D: ProcessingSpace,
    I: ProcessingSpace,
    T: Float,
{
    let px0 = I::process(x0)?;
    let px1 = I::process(x1)?;
    let px = I::process(x)?;
    let py0 = D::process(y0)?;
    let py1 = D::process(y1)?;

    Ok(D::recover(py0 + (py1 - py0) / (px1 - px0) * (px - px0)))
}
