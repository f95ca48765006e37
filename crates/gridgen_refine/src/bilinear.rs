//! Bilinear adaptive grid generation.
//!
//! A 2D generator whose secondary domain at primary value `x` is
//! `[lower_ylim(x), upper_ylim(x)]`. Both axes are linear and the unit-base
//! check measures the span of each secondary grid directly.

use crate::config::{DirtyConvergencePolicy, GridTolerances};
use crate::diagnostics::{ConvergenceObserver, GeneratorKind, Reporter};
use crate::error::GridError;
use crate::grid::{OneDGrid, TwoDGrid};
use crate::one_d::OneDGridGenerator;
use crate::two_d::{merge_primary_values, PrimaryRefinement};
use gridgen_core::math::interpolation::{interpolate_unit_base_linear, LinLin, LinLinLin};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Adaptive grid generator over a primary-dependent secondary range.
///
/// # Examples
///
/// ```
/// use gridgen_refine::{BilinearGridGenerator, GridTolerances};
///
/// // Secondary range widens with the primary value
/// let generator = BilinearGridGenerator::new(|_x| 0.0, |x| 1.0 + x, GridTolerances::default());
///
/// let table = generator.generate_and_evaluate(&[0.0, 1.0], |x, y| y / (1.0 + x)).unwrap();
/// assert_eq!(table.primary, vec![0.0, 1.0]);
/// assert_eq!(table.secondary[1], vec![0.0, 2.0]);
/// ```
#[derive(Clone)]
pub struct BilinearGridGenerator<L, U> {
    lower_ylim: L,
    upper_ylim: U,
    secondary_generator: OneDGridGenerator<LinLin>,
}

impl<L, U> fmt::Debug for BilinearGridGenerator<L, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BilinearGridGenerator")
            .field("tolerances", &self.secondary_generator.tolerances())
            .field("dirty_convergence", &self.secondary_generator.dirty_convergence())
            .finish_non_exhaustive()
    }
}

impl<L, U> BilinearGridGenerator<L, U>
where
    L: Fn(f64) -> f64,
    U: Fn(f64) -> f64,
{
    /// Create a generator with secondary limits `lower_ylim(x)` and
    /// `upper_ylim(x)`.
    pub fn new(lower_ylim: L, upper_ylim: U, tolerances: GridTolerances) -> Self {
        Self {
            lower_ylim,
            upper_ylim,
            secondary_generator: OneDGridGenerator::new(tolerances),
        }
    }

    /// Set the dirty-convergence policy.
    pub fn with_dirty_convergence(mut self, policy: DirtyConvergencePolicy) -> Self {
        self.set_dirty_convergence(policy);
        self
    }

    /// Set the convergence observer.
    pub fn with_observer(mut self, observer: Arc<dyn ConvergenceObserver>) -> Self {
        self.set_observer(observer);
        self
    }

    /// Embedded secondary generator.
    pub fn secondary_generator(&self) -> &OneDGridGenerator<LinLin> {
        &self.secondary_generator
    }

    /// Current tolerance set.
    pub fn tolerances(&self) -> GridTolerances {
        self.secondary_generator.tolerances()
    }

    /// Convergence tolerance.
    pub fn convergence_tolerance(&self) -> f64 {
        self.secondary_generator.convergence_tolerance()
    }

    /// Absolute difference tolerance.
    pub fn absolute_difference_tolerance(&self) -> f64 {
        self.secondary_generator.absolute_difference_tolerance()
    }

    /// Distance tolerance.
    pub fn distance_tolerance(&self) -> f64 {
        self.secondary_generator.distance_tolerance()
    }

    /// Dirty-convergence policy.
    pub fn dirty_convergence(&self) -> DirtyConvergencePolicy {
        self.secondary_generator.dirty_convergence()
    }

    /// Set the convergence tolerance (`(0, 1]`).
    pub fn set_convergence_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.secondary_generator.set_convergence_tolerance(tolerance)
    }

    /// Set the absolute difference tolerance (`[0, 1]`).
    pub fn set_absolute_difference_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.secondary_generator.set_absolute_difference_tolerance(tolerance)
    }

    /// Set the distance tolerance (`[0, 1]`).
    pub fn set_distance_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.secondary_generator.set_distance_tolerance(tolerance)
    }

    /// Set the dirty-convergence policy.
    pub fn set_dirty_convergence(&mut self, policy: DirtyConvergencePolicy) {
        self.secondary_generator.set_dirty_convergence(policy);
    }

    /// Set the convergence observer.
    pub fn set_observer(&mut self, observer: Arc<dyn ConvergenceObserver>) {
        self.secondary_generator.set_observer(observer);
    }

    /// Generate the primary grid from `anchors`.
    pub fn generate<F>(&self, anchors: &[f64], f: F) -> Result<Vec<f64>, GridError>
    where
        F: Fn(f64, f64) -> f64,
    {
        Ok(self.generate_and_evaluate(anchors, f)?.primary)
    }

    /// Generate the primary grid with a refined secondary grid and function
    /// values at every primary point.
    pub fn generate_and_evaluate<F>(&self, anchors: &[f64], f: F) -> Result<TwoDGrid, GridError>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.try_generate_and_evaluate(anchors, |x, y| Ok(f(x, y)))
    }

    /// Generate a bilinear grid for a fallible function.
    ///
    /// # Errors
    ///
    /// * [`GridError::InvalidRange`] - `lower_ylim(x) >= upper_ylim(x)` at a
    ///   visited primary value
    /// * any error returned by `f`, unmodified
    pub fn try_generate_and_evaluate<F>(&self, anchors: &[f64], f: F) -> Result<TwoDGrid, GridError>
    where
        F: Fn(f64, f64) -> Result<f64, GridError>,
    {
        let tolerances = self.tolerances();
        tolerances.validate()?;

        let primary = merge_primary_values(anchors, &[])?;

        let observer = self.secondary_generator.observer();
        let refinement = PrimaryRefinement {
            kind: GeneratorKind::Bilinear,
            tolerances,
            reporter: Reporter {
                policy: self.dirty_convergence(),
                observer: observer.as_ref(),
            },
            estimator: interpolate_unit_base_linear::<f64>,
            secondary: |x: f64| self.try_generate_secondary(x, &f),
            f: &f,
            _policy: PhantomData::<LinLinLin>,
        };

        refinement.run(primary.into())
    }

    /// Refined secondary grid and function values at `primary`.
    pub fn generate_secondary<F>(&self, primary: f64, f: F) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.try_generate_secondary(primary, &|x, y| Ok(f(x, y)))
    }

    fn try_generate_secondary<F>(&self, primary: f64, f: &F) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64, f64) -> Result<f64, GridError>,
    {
        let lower = (self.lower_ylim)(primary);
        let upper = (self.upper_ylim)(primary);
        if !(lower < upper) {
            return Err(GridError::invalid_range(lower, upper));
        }

        self.secondary_generator
            .try_generate_and_evaluate(&[lower, upper], |y| f(primary, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingObserver;
    use approx::assert_relative_eq;

    // ========================================
    // Generation
    // ========================================

    #[test]
    fn test_unit_base_linear_function_keeps_anchors() {
        let generator = BilinearGridGenerator::new(|_| 0.0, |x| 1.0 + x, GridTolerances::default())
            .with_dirty_convergence(DirtyConvergencePolicy::Error);
        let table = generator.generate_and_evaluate(&[0.0, 1.0], |x, y| y / (1.0 + x)).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.secondary, vec![vec![0.0, 1.0], vec![0.0, 2.0]]);
        assert_eq!(table.values, vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_plane_on_fixed_range() {
        let generator = BilinearGridGenerator::new(|_| 0.0, |_| 1.0, GridTolerances::default());
        let grid = generator.generate(&[0.0, 2.0], |x, y| 2.0 * x + 3.0 * y + 1.0).unwrap();
        assert_eq!(grid, vec![0.0, 2.0]);
    }

    #[test]
    fn test_widening_range_refines_primary() {
        let recorder = Arc::new(RecordingObserver::new());
        let generator =
            BilinearGridGenerator::new(|_| 0.0, |x| 1.0 + x, GridTolerances::default()).with_observer(recorder.clone());
        let table = generator.generate_and_evaluate(&[0.0, 1.0], |x, y| x + y).unwrap();

        assert!(table.len() > 2);
        assert_eq!(table.primary.first(), Some(&0.0));
        assert_eq!(table.primary.last(), Some(&1.0));
        assert!(table.primary.windows(2).all(|w| w[0] < w[1]));
        for (x, ys) in table.primary.iter().zip(table.secondary.iter()) {
            assert_eq!(ys.first(), Some(&0.0));
            assert_relative_eq!(*ys.last().unwrap(), 1.0 + x);
        }

        let z = table.evaluate_linear(0.4, 0.7).unwrap();
        assert_relative_eq!(z, 1.1, max_relative = 1e-3);
    }

    #[test]
    fn test_concave_limit_terminates() {
        let generator = BilinearGridGenerator::new(|_| 0.0, f64::sqrt, GridTolerances::default());
        let grid = generator.generate(&[1.0, 4.0], |x, y| x * y).unwrap();

        assert!(grid.len() > 2);
        assert_eq!(grid.first(), Some(&1.0));
        assert_eq!(grid.last(), Some(&4.0));
    }

    // ========================================
    // Errors
    // ========================================

    #[test]
    fn test_collapsed_range_is_rejected() {
        let generator = BilinearGridGenerator::new(|_| 0.0, |x| x, GridTolerances::default());
        assert_eq!(
            generator.generate(&[0.0, 1.0], |x, y| x + y).unwrap_err(),
            GridError::invalid_range(0.0, 0.0)
        );
        assert!(generator.generate_secondary(0.5, |x, y| x + y).is_ok());
    }

    #[test]
    fn test_setters_propagate() {
        let mut generator = BilinearGridGenerator::new(|_| 0.0, |_| 1.0, GridTolerances::default());
        generator.set_convergence_tolerance(1e-5).unwrap();
        generator.set_dirty_convergence(DirtyConvergencePolicy::Error);

        assert_eq!(generator.secondary_generator().convergence_tolerance(), 1e-5);
        assert_eq!(
            generator.secondary_generator().dirty_convergence(),
            DirtyConvergencePolicy::Error
        );
        assert!(generator.set_absolute_difference_tolerance(-1.0).is_err());
    }
}
