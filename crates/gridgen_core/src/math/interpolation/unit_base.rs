//! Unit-base interpolation between secondary grids of different span.
//!
//! A two-dimensional table `z(x, y)` is stored as a primary grid of `x`
//! values, each owning its own secondary grid of `y` values. Adjacent
//! secondary grids may cover different `y` ranges, so a value between two
//! primary points cannot be found by interpolating both grids at the same
//! `y`. Unit-base interpolation maps `y` onto a fractional position
//! `eta in [0, 1]` of an intermediate grid whose limits and length are
//! themselves interpolated over `x`, projects `eta` back onto each of the
//! two source grids, and combines the two span-weighted estimates.
//!
//! Policy names list the processing spaces in `Z`, `Y`, `X` order:
//! [`LogLinLin`] is logarithmic in the dependent variable and linear in
//! both independent variables.

use super::grid::{check_table_shape, interpolate_and_process_on_grid, interpolate_on_grid, GRID_FUZZ};
use super::policy::{InterpolationPolicy, LinLin, LinLog, LogLin, LogLog};
use super::space::{interpolate_in_spaces, Lin, ProcessingSpace};
use crate::math::comparison::fuzzy_lower_bound;
use crate::types::InterpolationError;
use num_traits::Float;
use std::fmt;
use std::marker::PhantomData;

/// A pair of 1D policies describing interpolation over a 2D table.
///
/// `Secondary` governs interpolation along each secondary grid (Z–Y) and
/// `Primary` governs interpolation across primary values (Z–X). Both must
/// share the same dependent processing space.
pub trait TwoDInterpolationPolicy: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Z–Y policy (along a secondary grid).
    type Secondary: InterpolationPolicy;
    /// Z–X policy (across primary values).
    type Primary: InterpolationPolicy<Dep = <Self::Secondary as InterpolationPolicy>::Dep>;

    /// Midpoint of two primary values in the primary processed space.
    #[inline]
    fn primary_midpoint<T: Float>(x0: T, x1: T) -> Result<T, InterpolationError> {
        Self::Primary::midpoint(x0, x1)
    }

    /// Midpoint of two secondary values in the secondary processed space.
    #[inline]
    fn secondary_midpoint<T: Float>(y0: T, y1: T) -> Result<T, InterpolationError> {
        Self::Secondary::midpoint(y0, y1)
    }

    /// Processed length of a secondary grid (`L`).
    ///
    /// For logarithmic secondary spaces this is `ln(y_max) - ln(y_min)`,
    /// not a physical length.
    #[inline]
    fn grid_length<T: Float>(ys: &[T]) -> Result<T, InterpolationError> {
        if ys.is_empty() {
            return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
        }

        Ok(Self::Secondary::process_indep(ys[ys.len() - 1])? - Self::Secondary::process_indep(ys[0])?)
    }

    /// Length of the intermediate grid at `x` (`Lx`).
    ///
    /// The length is interpolated linearly over the primary processed space.
    #[inline]
    fn intermediate_grid_length<T: Float>(
        x0: T,
        x1: T,
        x: T,
        length_0: T,
        length_1: T,
    ) -> Result<T, InterpolationError> {
        interpolate_in_spaces::<Lin, <Self::Primary as InterpolationPolicy>::Indep, T>(
            x0, x1, x, length_0, length_1,
        )
    }

    /// A limit (minimum or maximum) of the intermediate grid at `x`.
    ///
    /// The limit is interpolated in the secondary processed space over the
    /// primary processed space.
    #[inline]
    fn intermediate_grid_limit<T: Float>(
        x0: T,
        x1: T,
        x: T,
        limit_0: T,
        limit_1: T,
    ) -> Result<T, InterpolationError> {
        interpolate_in_spaces::<
            <Self::Secondary as InterpolationPolicy>::Indep,
            <Self::Primary as InterpolationPolicy>::Indep,
            T,
        >(x0, x1, x, limit_0, limit_1)
    }

    /// Unit-base independent variable `eta` of `y` on a grid starting at
    /// `y_min` with processed length `length`.
    ///
    /// Values that fall outside `[0, 1]` by less than `tol` are snapped to
    /// the nearest bound.
    ///
    /// # Errors
    ///
    /// * [`InterpolationError::InvalidInput`] - `length` is not positive
    /// * [`InterpolationError::OutOfBounds`] - `y` lies outside the grid
    fn unit_base_indep_var<T: Float>(y: T, y_min: T, length: T, tol: T) -> Result<T, InterpolationError> {
        if !(length > T::zero()) {
            return Err(InterpolationError::InvalidInput(format!(
                "unit-base grid length must be positive: got {}",
                length.to_f64().unwrap_or(f64::NAN)
            )));
        }

        let processed_y_min = Self::Secondary::process_indep(y_min)?;
        let mut eta = (Self::Secondary::process_indep(y)? - processed_y_min) / length;

        if eta > T::one() && eta - T::one() < tol {
            eta = T::one();
        } else if eta < T::zero() && eta > -tol {
            eta = T::zero();
        }

        if eta < T::zero() || eta > T::one() {
            return Err(InterpolationError::OutOfBounds {
                x: y.to_f64().unwrap_or(f64::NAN),
                min: y_min.to_f64().unwrap_or(f64::NAN),
                max: Self::Secondary::recover_indep(processed_y_min + length)
                    .to_f64()
                    .unwrap_or(f64::NAN),
            });
        }

        Ok(eta)
    }

    /// Secondary value at fraction `eta` of a grid starting at `y_min`
    /// with processed length `length`.
    ///
    /// Results that undershoot `y_min` by rounding (within `tol`) are
    /// clamped to `y_min`.
    #[inline]
    fn indep_var_from_unit_base<T: Float>(eta: T, y_min: T, length: T, tol: T) -> Result<T, InterpolationError> {
        let y = Self::Secondary::recover_indep(Self::Secondary::process_indep(y_min)? + length * eta);

        if y < y_min && y >= fuzzy_lower_bound(y_min, tol) {
            Ok(y_min)
        } else {
            Ok(y)
        }
    }

    /// Unit-base interpolation of `z(x, y)` between two secondary grids.
    ///
    /// `(ys_0, zs_0)` is the secondary grid at `x0` and `(ys_1, zs_1)` the
    /// grid at `x1`; `x` must lie in `[x0, x1]`. When `x` equals `x0` or
    /// `x1` exactly, the corresponding grid is interpolated directly and
    /// its own values are returned unmodified.
    ///
    /// # Errors
    ///
    /// * [`InterpolationError::InsufficientData`] - a secondary grid has fewer than 2 points
    /// * [`InterpolationError::InvalidInput`] - a secondary grid and its values differ in length
    /// * [`InterpolationError::OutOfBounds`] - `x` or `y` is outside the table
    /// * [`InterpolationError::Domain`] - a value is outside a policy domain
    ///
    /// # Example
    ///
    /// ```
    /// use gridgen_core::math::interpolation::{LinLinLin, TwoDInterpolationPolicy};
    ///
    /// // z = x + y tabulated on grids of different span
    /// let ys_0 = [0.0, 1.0];
    /// let zs_0 = [0.0, 1.0];
    /// let ys_1 = [0.0, 3.0];
    /// let zs_1 = [2.0, 5.0];
    ///
    /// let z = LinLinLin::interpolate_unit_base(0.0, 2.0, 0.0, 0.5, &ys_0, &zs_0, &ys_1, &zs_1).unwrap();
    /// assert_eq!(z, 0.5);
    /// ```
    #[allow(clippy::too_many_arguments)]
    fn interpolate_unit_base<T: Float>(
        x0: T,
        x1: T,
        x: T,
        y: T,
        ys_0: &[T],
        zs_0: &[T],
        ys_1: &[T],
        zs_1: &[T],
    ) -> Result<T, InterpolationError> {
        check_secondary_tables(ys_0, zs_0, ys_1, zs_1)?;

        if x < x0 || x > x1 {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: x0.to_f64().unwrap_or(f64::NAN),
                max: x1.to_f64().unwrap_or(f64::NAN),
            });
        }

        if x == x0 {
            return interpolate_on_grid::<Self::Secondary, T>(y, ys_0, zs_0);
        }
        if x == x1 {
            return interpolate_on_grid::<Self::Secondary, T>(y, ys_1, zs_1);
        }

        let tol = T::from(GRID_FUZZ).unwrap_or_else(T::epsilon);

        let length_0 = Self::grid_length(ys_0)?;
        let length_1 = Self::grid_length(ys_1)?;
        let length_x = Self::intermediate_grid_length(x0, x1, x, length_0, length_1)?;

        let y_x_min = Self::intermediate_grid_limit(x0, x1, x, ys_0[0], ys_1[0])?;
        let eta = Self::unit_base_indep_var(y, y_x_min, length_x, tol)?;

        let y_0 = Self::indep_var_from_unit_base(eta, ys_0[0], length_0, tol)?;
        let y_1 = Self::indep_var_from_unit_base(eta, ys_1[0], length_1, tol)?;

        let processed_z_0 = interpolate_and_process_on_grid::<Self::Secondary, T>(y_0, ys_0, zs_0)?;
        let processed_z_1 = interpolate_and_process_on_grid::<Self::Secondary, T>(y_1, ys_1, zs_1)?;

        // Span-weighted combination across the primary axis
        let processed_x0 = Self::Primary::process_indep(x0)?;
        let scaled_z_0 = processed_z_0 * length_0;
        let slope = Self::Primary::processed_slope(
            processed_x0,
            Self::Primary::process_indep(x1)?,
            scaled_z_0,
            processed_z_1 * length_1,
        );

        let processed_z = Self::Primary::interpolate_and_process_from_processed(
            processed_x0,
            Self::Primary::process_indep(x)?,
            scaled_z_0,
            slope,
        ) / length_x;

        Ok(Self::Primary::recover_dep(processed_z))
    }
}

/// Unit-base 2D policy built from a Z–Y and a Z–X policy.
///
/// Use the aliases ([`LinLinLin`], [`LogLogLog`], ...) rather than naming
/// this type directly.
pub struct UnitBasePolicy<ZY, ZX>(PhantomData<(ZY, ZX)>);

impl<ZY, ZX> Clone for UnitBasePolicy<ZY, ZX> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<ZY, ZX> Copy for UnitBasePolicy<ZY, ZX> {}

impl<ZY, ZX> Default for UnitBasePolicy<ZY, ZX> {
    fn default() -> Self {
        UnitBasePolicy(PhantomData)
    }
}

impl<ZY: InterpolationPolicy, ZX: InterpolationPolicy> fmt::Debug for UnitBasePolicy<ZY, ZX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnitBasePolicy({}: {} / {})",
            <ZY::Dep as ProcessingSpace>::NAME,
            ZY::KIND,
            ZX::KIND
        )
    }
}

impl<ZY, ZX> TwoDInterpolationPolicy for UnitBasePolicy<ZY, ZX>
where
    ZY: InterpolationPolicy,
    ZX: InterpolationPolicy<Dep = ZY::Dep>,
{
    type Secondary = ZY;
    type Primary = ZX;
}

/// Linear `z`, linear `y`, linear `x`.
pub type LinLinLin = UnitBasePolicy<LinLin, LinLin>;
/// Linear `z`, linear `y`, logarithmic `x`.
pub type LinLinLog = UnitBasePolicy<LinLin, LinLog>;
/// Linear `z`, logarithmic `y`, linear `x`.
pub type LinLogLin = UnitBasePolicy<LinLog, LinLin>;
/// Linear `z`, logarithmic `y`, logarithmic `x`.
pub type LinLogLog = UnitBasePolicy<LinLog, LinLog>;
/// Logarithmic `z`, linear `y`, linear `x`.
pub type LogLinLin = UnitBasePolicy<LogLin, LogLin>;
/// Logarithmic `z`, linear `y`, logarithmic `x`.
pub type LogLinLog = UnitBasePolicy<LogLin, LogLog>;
/// Logarithmic `z`, logarithmic `y`, linear `x`.
pub type LogLogLin = UnitBasePolicy<LogLog, LogLin>;
/// Logarithmic `z`, logarithmic `y`, logarithmic `x`.
pub type LogLogLog = UnitBasePolicy<LogLog, LogLog>;

/// Unit-base interpolation with spans measured directly on raw values.
///
/// Specialisation used when the secondary variable is always linear: the
/// span of each secondary grid is `ys.last() - ys.first()` with no
/// processing, and both axes are interpolated linearly.
///
/// # Example
///
/// ```
/// use gridgen_core::math::interpolation::interpolate_unit_base_linear;
///
/// // z = y / (1 + x) on y in [0, 1 + x]
/// let ys_0 = [0.0, 1.0];
/// let zs_0 = [0.0, 1.0];
/// let ys_1 = [0.0, 2.0];
/// let zs_1 = [0.0, 1.0];
///
/// let z: f64 = interpolate_unit_base_linear(0.0, 1.0, 0.5, 0.75, &ys_0, &zs_0, &ys_1, &zs_1).unwrap();
/// assert!((z - 0.5).abs() < 1e-12);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn interpolate_unit_base_linear<T: Float>(
    x0: T,
    x1: T,
    x: T,
    y: T,
    ys_0: &[T],
    zs_0: &[T],
    ys_1: &[T],
    zs_1: &[T],
) -> Result<T, InterpolationError> {
    check_secondary_tables(ys_0, zs_0, ys_1, zs_1)?;

    if x == x0 {
        return interpolate_on_grid::<LinLin, T>(y, ys_0, zs_0);
    }
    if x == x1 {
        return interpolate_on_grid::<LinLin, T>(y, ys_1, zs_1);
    }

    let length_0 = ys_0[ys_0.len() - 1] - ys_0[0];
    let length_1 = ys_1[ys_1.len() - 1] - ys_1[0];
    let length_x = LinLin::interpolate(x0, x1, x, length_0, length_1)?;
    let y_x_min = LinLin::interpolate(x0, x1, x, ys_0[0], ys_1[0])?;

    let tol = T::from(GRID_FUZZ).unwrap_or_else(T::epsilon);
    let eta = LinLinLin::unit_base_indep_var(y, y_x_min, length_x, tol)?;

    let y_0 = LinLinLin::indep_var_from_unit_base(eta, ys_0[0], length_0, tol)?;
    let y_1 = LinLinLin::indep_var_from_unit_base(eta, ys_1[0], length_1, tol)?;

    let z_0 = interpolate_on_grid::<LinLin, T>(y_0, ys_0, zs_0)?;
    let z_1 = interpolate_on_grid::<LinLin, T>(y_1, ys_1, zs_1)?;

    Ok(LinLin::interpolate(x0, x1, x, z_0 * length_0, z_1 * length_1)? / length_x)
}

/// Both secondary tables need matching lengths and at least 2 points.
fn check_secondary_tables<T>(ys_0: &[T], zs_0: &[T], ys_1: &[T], zs_1: &[T]) -> Result<(), InterpolationError> {
    check_table_shape(ys_0, zs_0)?;
    check_table_shape(ys_1, zs_1)
}
