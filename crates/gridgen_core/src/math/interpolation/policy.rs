//! One-dimensional interpolation policies.
//!
//! A policy fixes how the independent (x) and dependent (y) variables are
//! processed before a straight line is drawn between two points. Policy
//! names list the dependent space first: [`LogLin`] is logarithmic in `y`
//! and linear in `x`, so it reproduces `y = a * exp(b * x)` exactly.

use super::space::{Lin, Log, ProcessingSpace};
use crate::types::InterpolationError;
use num_traits::Float;
use std::fmt;

/// Identifies a 1D interpolation policy at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationType {
    /// Linear `y`, linear `x`
    LinLin,
    /// Linear `y`, logarithmic `x`
    LinLog,
    /// Logarithmic `y`, linear `x`
    LogLin,
    /// Logarithmic `y`, logarithmic `x`
    LogLog,
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterpolationType::LinLin => "Lin-Lin",
            InterpolationType::LinLog => "Lin-Log",
            InterpolationType::LogLin => "Log-Lin",
            InterpolationType::LogLog => "Log-Log",
        };
        write!(f, "{}", name)
    }
}

/// Capability set shared by all 1D interpolation policies.
///
/// Every operation is an associated function: policies are zero-sized,
/// stateless, and selected through generic parameters, so the innermost
/// refinement loops are monomorphised with no dynamic dispatch.
///
/// # Example
///
/// ```
/// use gridgen_core::math::interpolation::{InterpolationPolicy, LinLin, LogLog};
///
/// // y = 2x is exact under Lin-Lin
/// let y: f64 = LinLin::interpolate(0.0, 4.0, 1.0, 0.0, 8.0).unwrap();
/// assert!((y - 2.0).abs() < 1e-12);
///
/// // y = x^2 is exact under Log-Log
/// let y: f64 = LogLog::interpolate(1.0, 10.0, 3.0, 1.0, 100.0).unwrap();
/// assert!((y - 9.0).abs() < 1e-10);
///
/// // Logarithmic policies reject non-positive arguments
/// assert!(LogLog::process_indep(0.0).is_err());
/// ```
pub trait InterpolationPolicy: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Processing space of the independent variable.
    type Indep: ProcessingSpace;
    /// Processing space of the dependent variable.
    type Dep: ProcessingSpace;
    /// Runtime tag of this policy.
    const KIND: InterpolationType;

    /// Map an independent value into the processed space.
    #[inline]
    fn process_indep<T: Float>(x: T) -> Result<T, InterpolationError> {
        Self::Indep::process(x)
    }

    /// Map a dependent value into the processed space.
    #[inline]
    fn process_dep<T: Float>(y: T) -> Result<T, InterpolationError> {
        Self::Dep::process(y)
    }

    /// Inverse of [`InterpolationPolicy::process_indep`].
    #[inline]
    fn recover_indep<T: Float>(processed_x: T) -> T {
        Self::Indep::recover(processed_x)
    }

    /// Inverse of [`InterpolationPolicy::process_dep`].
    #[inline]
    fn recover_dep<T: Float>(processed_y: T) -> T {
        Self::Dep::recover(processed_y)
    }

    /// Returns `true` if `x` lies in the independent domain.
    #[inline]
    fn is_indep_valid<T: Float>(x: T) -> bool {
        Self::Indep::is_valid(x)
    }

    /// Returns `true` if `y` lies in the dependent domain.
    #[inline]
    fn is_dep_valid<T: Float>(y: T) -> bool {
        Self::Dep::is_valid(y)
    }

    /// Interpolate `y(x)` between `(x0, y0)` and `(x1, y1)`.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::Domain`] if any argument is outside
    /// the domain of its processing space.
    fn interpolate<T: Float>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError>;

    /// Interpolate `y(x)` and return it in processed form.
    #[inline]
    fn interpolate_and_process<T: Float>(
        x0: T,
        x1: T,
        x: T,
        y0: T,
        y1: T,
    ) -> Result<T, InterpolationError> {
        Self::process_dep(Self::interpolate(x0, x1, x, y0, y1)?)
    }

    /// Slope of the line between two processed points.
    #[inline]
    fn processed_slope<T: Float>(processed_x0: T, processed_x1: T, processed_y0: T, processed_y1: T) -> T {
        (processed_y1 - processed_y0) / (processed_x1 - processed_x0)
    }

    /// Interpolate from pre-processed values and a precomputed slope,
    /// returning the processed dependent value.
    #[inline]
    fn interpolate_and_process_from_processed<T: Float>(
        processed_x0: T,
        processed_x: T,
        processed_y0: T,
        processed_slope: T,
    ) -> T {
        processed_y0 + processed_slope * (processed_x - processed_x0)
    }

    /// Interpolate from pre-processed values and a precomputed slope.
    ///
    /// Equivalent to [`InterpolationPolicy::interpolate`] but avoids
    /// repeated log/exp evaluations when the same segment is queried many
    /// times.
    #[inline]
    fn interpolate_from_processed<T: Float>(
        processed_x0: T,
        processed_x: T,
        processed_y0: T,
        processed_slope: T,
    ) -> T {
        Self::recover_dep(Self::interpolate_and_process_from_processed(
            processed_x0,
            processed_x,
            processed_y0,
            processed_slope,
        ))
    }

    /// Midpoint of two independent values in the processed space.
    ///
    /// For logarithmic independent spaces this is the geometric mean, never
    /// the arithmetic mean.
    #[inline]
    fn midpoint<T: Float>(x0: T, x1: T) -> Result<T, InterpolationError> {
        let two = T::one() + T::one();
        Ok(Self::recover_indep(
            (Self::process_indep(x0)? + Self::process_indep(x1)?) / two,
        ))
    }
}

/// Fail with a domain error unless every value is valid in `S`.
#[inline]
fn check_domain<S: ProcessingSpace, T: Float>(values: &[T]) -> Result<(), InterpolationError> {
    match values.iter().find(|&&v| !S::is_valid(v)) {
        Some(&v) => Err(InterpolationError::domain(
            v.to_f64().unwrap_or(f64::NAN),
            S::NAME,
        )),
        None => Ok(()),
    }
}

/// Linear `y`, linear `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinLin;

/// Linear `y`, logarithmic `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinLog;

/// Logarithmic `y`, linear `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogLin;

/// Logarithmic `y`, logarithmic `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LogLog;

impl InterpolationPolicy for LinLin {
    type Indep = Lin;
    type Dep = Lin;
    const KIND: InterpolationType = InterpolationType::LinLin;

    #[inline]
    fn interpolate<T: Float>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError> {
        Ok(y0 + (y1 - y0) / (x1 - x0) * (x - x0))
    }
}

impl InterpolationPolicy for LinLog {
    type Indep = Log;
    type Dep = Lin;
    const KIND: InterpolationType = InterpolationType::LinLog;

    #[inline]
    fn interpolate<T: Float>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError> {
        check_domain::<Log, T>(&[x0, x1, x])?;

        Ok(y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln())
    }
}

impl InterpolationPolicy for LogLin {
    type Indep = Lin;
    type Dep = Log;
    const KIND: InterpolationType = InterpolationType::LogLin;

    #[inline]
    fn interpolate<T: Float>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError> {
        check_domain::<Log, T>(&[y0, y1])?;

        Ok(y0 * (y1 / y0).powf((x - x0) / (x1 - x0)))
    }

    #[inline]
    fn interpolate_and_process<T: Float>(
        x0: T,
        x1: T,
        x: T,
        y0: T,
        y1: T,
    ) -> Result<T, InterpolationError> {
        check_domain::<Log, T>(&[y0, y1])?;

        Ok(y0.ln() + (y1 / y0).ln() * (x - x0) / (x1 - x0))
    }
}

impl InterpolationPolicy for LogLog {
    type Indep = Log;
    type Dep = Log;
    const KIND: InterpolationType = InterpolationType::LogLog;

    #[inline]
    fn interpolate<T: Float>(x0: T, x1: T, x: T, y0: T, y1: T) -> Result<T, InterpolationError> {
        check_domain::<Log, T>(&[x0, x1, x])?;
        check_domain::<Log, T>(&[y0, y1])?;

        Ok(y0 * (y1 / y0).powf((x / x0).ln() / (x1 / x0).ln()))
    }

    #[inline]
    fn interpolate_and_process<T: Float>(
        x0: T,
        x1: T,
        x: T,
        y0: T,
        y1: T,
    ) -> Result<T, InterpolationError> {
        check_domain::<Log, T>(&[x0, x1, x])?;
        check_domain::<Log, T>(&[y0, y1])?;

        Ok(y0.ln() + (y1 / y0).ln() * (x / x0).ln() / (x1 / x0).ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Processing
    // ========================================

    #[test]
    fn test_kind_and_display() {
        assert_eq!(LinLin::KIND, InterpolationType::LinLin);
        assert_eq!(LogLin::KIND, InterpolationType::LogLin);
        assert_eq!(format!("{}", LinLog::KIND), "Lin-Log");
        assert_eq!(format!("{}", LogLog::KIND), "Log-Log");
    }

    #[test]
    fn test_process_and_recover_are_inverse() {
        let x = 3.7_f64;
        assert_relative_eq!(LinLog::recover_indep(LinLog::process_indep(x).unwrap()), x, max_relative = 1e-15);
        assert_relative_eq!(LogLin::recover_dep(LogLin::process_dep(x).unwrap()), x, max_relative = 1e-15);
        assert_eq!(LinLin::recover_dep(LinLin::process_dep(x).unwrap()), x);
    }

    #[test]
    fn test_validity_predicates() {
        assert!(LinLin::is_indep_valid(-1.0) && LinLin::is_dep_valid(-1.0));
        assert!(!LinLog::is_indep_valid(0.0) && LinLog::is_dep_valid(-1.0));
        assert!(LogLin::is_indep_valid(-1.0) && !LogLin::is_dep_valid(-1.0));
        assert!(!LogLog::is_indep_valid(-1.0) && !LogLog::is_dep_valid(0.0));
    }

    #[test]
    fn test_midpoint_is_geometric_for_log_indep() {
        assert_relative_eq!(LinLin::midpoint(1.0, 100.0).unwrap(), 50.5);
        assert_relative_eq!(LinLog::midpoint(1.0, 100.0).unwrap(), 10.0, max_relative = 1e-14);
        assert_relative_eq!(LogLog::midpoint(1.0, 100.0).unwrap(), 10.0, max_relative = 1e-14);
        assert!(LogLog::midpoint(0.0, 1.0).is_err());
    }

    // ========================================
    // Interpolation formulas
    // ========================================

    #[test]
    fn test_linlin_reproduces_line() {
        let y = LinLin::interpolate(1.0, 3.0, 2.5, 2.0, 6.0).unwrap();
        assert_relative_eq!(y, 5.0);
    }

    #[test]
    fn test_linlog_reproduces_log_curve() {
        // y = ln(x)
        let y = LinLog::interpolate(1.0, 100.0, 10.0, 0.0, 100.0_f64.ln()).unwrap();
        assert_relative_eq!(y, 10.0_f64.ln(), max_relative = 1e-14);
    }

    #[test]
    fn test_loglin_reproduces_exponential() {
        // y = exp(2x)
        let f = |x: f64| (2.0 * x).exp();
        let y = LogLin::interpolate(0.0, 1.0, 0.3, f(0.0), f(1.0)).unwrap();
        assert_relative_eq!(y, f(0.3), max_relative = 1e-14);
    }

    #[test]
    fn test_loglog_reproduces_power_law() {
        let f = |x: f64| 3.0 * x.powf(-1.5);
        let y = LogLog::interpolate(0.1, 10.0, 2.0, f(0.1), f(10.0)).unwrap();
        assert_relative_eq!(y, f(2.0), max_relative = 1e-13);
    }

    #[test]
    fn test_interpolate_at_endpoints() {
        assert_relative_eq!(LogLog::interpolate(1.0, 4.0, 1.0, 2.0, 8.0).unwrap(), 2.0);
        assert_relative_eq!(LogLog::interpolate(1.0, 4.0, 4.0, 2.0, 8.0).unwrap(), 8.0, max_relative = 1e-14);
        assert_relative_eq!(LinLin::interpolate(1.0, 4.0, 4.0, 2.0, 8.0).unwrap(), 8.0);
    }

    #[test]
    fn test_domain_errors() {
        assert!(LinLog::interpolate(0.0, 1.0, 0.5, 1.0, 2.0).unwrap_err().is_domain_error());
        assert!(LogLin::interpolate(0.0, 1.0, 0.5, -1.0, 2.0).unwrap_err().is_domain_error());
        assert!(LogLog::interpolate(1.0, 2.0, 1.5, 0.0, 2.0).unwrap_err().is_domain_error());
        // Lin-Lin accepts anything
        assert!(LinLin::interpolate(-1.0, 1.0, 0.0, -5.0, 5.0).is_ok());
    }

    // ========================================
    // Processed-value helpers
    // ========================================

    #[test]
    fn test_interpolate_and_process_matches_processed_interpolation() {
        let (x0, x1, x, y0, y1) = (1.0, 5.0, 2.0, 3.0, 30.0);
        let processed = LogLog::interpolate_and_process(x0, x1, x, y0, y1).unwrap();
        let direct = LogLog::interpolate(x0, x1, x, y0, y1).unwrap();
        assert_relative_eq!(processed, direct.ln(), max_relative = 1e-13);

        let processed = LogLin::interpolate_and_process(x0, x1, x, y0, y1).unwrap();
        let direct = LogLin::interpolate(x0, x1, x, y0, y1).unwrap();
        assert_relative_eq!(processed, direct.ln(), max_relative = 1e-13);

        let processed = LinLog::interpolate_and_process(x0, x1, x, y0, y1).unwrap();
        let direct = LinLog::interpolate(x0, x1, x, y0, y1).unwrap();
        assert_relative_eq!(processed, direct, max_relative = 1e-14);
    }

    #[test]
    fn test_interpolate_from_processed_matches_interpolate() {
        let (x0, x1, x, y0, y1) = (2.0, 8.0, 5.0, 1.5, 12.0);

        let px0 = LogLog::process_indep(x0).unwrap();
        let px1 = LogLog::process_indep(x1).unwrap();
        let py0 = LogLog::process_dep(y0).unwrap();
        let py1 = LogLog::process_dep(y1).unwrap();
        let slope = LogLog::processed_slope(px0, px1, py0, py1);

        let from_processed =
            LogLog::interpolate_from_processed(px0, LogLog::process_indep(x).unwrap(), py0, slope);
        let direct = LogLog::interpolate(x0, x1, x, y0, y1).unwrap();
        assert_relative_eq!(from_processed, direct, max_relative = 1e-13);

        let slope = LinLin::processed_slope(x0, x1, y0, y1);
        assert_relative_eq!(
            LinLin::interpolate_from_processed(x0, x, y0, slope),
            LinLin::interpolate(x0, x1, x, y0, y1).unwrap(),
            max_relative = 1e-15
        );
    }
}
