//! One-dimensional adaptive grid generation.
//!
//! The generator bisects every pair of adjacent grid points until the
//! function value at the policy-space midpoint is reproduced by
//! interpolation within the configured tolerances. Refinement is driven by
//! an explicit work queue: a rejected midpoint is pushed to the front of
//! the queue and retried against the current lower point, so stack depth
//! is independent of refinement depth.

use crate::config::{DirtyConvergencePolicy, GridTolerances};
use crate::diagnostics::{default_observer, ConvergenceEvent, ConvergenceObserver, GeneratorKind, Reporter, LOG_TARGET};
use crate::error::GridError;
use crate::grid::OneDGrid;
use gridgen_core::math::comparison::{absolute_difference, relative_error};
use gridgen_core::math::interpolation::{InterpolationPolicy, ProcessingSpace};
use gridgen_core::types::InterpolationError;
use std::collections::VecDeque;
use std::fmt;
use std::iter;
use std::marker::PhantomData;
use std::sync::Arc;

/// Adaptive 1D grid generator for interpolation policy `P`.
///
/// # Examples
///
/// ```
/// use gridgen_core::math::interpolation::{LinLin, LogLog};
/// use gridgen_refine::{GridTolerances, OneDGridGenerator};
///
/// let generator = OneDGridGenerator::<LinLin>::new(GridTolerances::default());
/// let grid = generator.generate(&[0.0, 10.0], |x| x * x).unwrap();
/// assert_eq!(grid.len(), 321);
///
/// // A power law is a straight line in log-log space
/// let generator = OneDGridGenerator::<LogLog>::new(GridTolerances::default());
/// let grid = generator.generate(&[1.0, 100.0], |x| x * x).unwrap();
/// assert_eq!(grid, vec![1.0, 100.0]);
/// ```
#[derive(Clone)]
pub struct OneDGridGenerator<P: InterpolationPolicy> {
    tolerances: GridTolerances,
    dirty_convergence: DirtyConvergencePolicy,
    observer: Arc<dyn ConvergenceObserver>,
    _policy: PhantomData<P>,
}

impl<P: InterpolationPolicy> Default for OneDGridGenerator<P> {
    fn default() -> Self {
        Self::new(GridTolerances::default())
    }
}

impl<P: InterpolationPolicy> fmt::Debug for OneDGridGenerator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneDGridGenerator")
            .field("policy", &P::KIND)
            .field("tolerances", &self.tolerances)
            .field("dirty_convergence", &self.dirty_convergence)
            .finish_non_exhaustive()
    }
}

impl<P: InterpolationPolicy> OneDGridGenerator<P> {
    /// Create a generator that warns on dirty convergence through
    /// [`TracingObserver`](crate::diagnostics::TracingObserver).
    pub fn new(tolerances: GridTolerances) -> Self {
        Self {
            tolerances,
            dirty_convergence: DirtyConvergencePolicy::default(),
            observer: default_observer(),
            _policy: PhantomData,
        }
    }

    /// Set the dirty-convergence policy.
    pub fn with_dirty_convergence(mut self, policy: DirtyConvergencePolicy) -> Self {
        self.dirty_convergence = policy;
        self
    }

    /// Set the convergence observer.
    pub fn with_observer(mut self, observer: Arc<dyn ConvergenceObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Current tolerance set.
    #[inline]
    pub fn tolerances(&self) -> GridTolerances {
        self.tolerances
    }

    /// Convergence tolerance.
    #[inline]
    pub fn convergence_tolerance(&self) -> f64 {
        self.tolerances.convergence()
    }

    /// Absolute difference tolerance.
    #[inline]
    pub fn absolute_difference_tolerance(&self) -> f64 {
        self.tolerances.absolute_difference()
    }

    /// Distance tolerance.
    #[inline]
    pub fn distance_tolerance(&self) -> f64 {
        self.tolerances.distance()
    }

    /// Dirty-convergence policy.
    #[inline]
    pub fn dirty_convergence(&self) -> DirtyConvergencePolicy {
        self.dirty_convergence
    }

    /// Replace the whole tolerance set.
    pub fn set_tolerances(&mut self, tolerances: GridTolerances) -> Result<(), GridError> {
        tolerances.validate()?;
        self.tolerances = tolerances;
        Ok(())
    }

    /// Set the convergence tolerance (`(0, 1]`).
    pub fn set_convergence_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.tolerances = self.tolerances.with_convergence(tolerance)?;
        Ok(())
    }

    /// Set the absolute difference tolerance (`[0, 1]`).
    pub fn set_absolute_difference_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.tolerances = self.tolerances.with_absolute_difference(tolerance)?;
        Ok(())
    }

    /// Set the distance tolerance (`[0, 1]`).
    pub fn set_distance_tolerance(&mut self, tolerance: f64) -> Result<(), GridError> {
        self.tolerances = self.tolerances.with_distance(tolerance)?;
        Ok(())
    }

    /// Set the dirty-convergence policy.
    pub fn set_dirty_convergence(&mut self, policy: DirtyConvergencePolicy) {
        self.dirty_convergence = policy;
    }

    /// Set the convergence observer.
    pub fn set_observer(&mut self, observer: Arc<dyn ConvergenceObserver>) {
        self.observer = observer;
    }

    pub(crate) fn observer(&self) -> &Arc<dyn ConvergenceObserver> {
        &self.observer
    }

    /// Generate a grid from `anchors`.
    ///
    /// `anchors` must hold at least two ascending points and should include
    /// the points flanking any discontinuity of `f`.
    pub fn generate<F>(&self, anchors: &[f64], f: F) -> Result<Vec<f64>, GridError>
    where
        F: Fn(f64) -> f64,
    {
        Ok(self.generate_and_evaluate(anchors, f)?.grid)
    }

    /// Generate a grid from `anchors` and return it with the function
    /// values.
    pub fn generate_and_evaluate<F>(&self, anchors: &[f64], f: F) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64) -> f64,
    {
        self.try_generate_and_evaluate(anchors, |x| Ok(f(x)))
    }

    /// Generate a grid for a fallible function.
    ///
    /// The first evaluation error aborts generation and is returned
    /// unmodified.
    pub fn try_generate_and_evaluate<F>(&self, anchors: &[f64], f: F) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64) -> Result<f64, GridError>,
    {
        let anchors = prepare_anchors(anchors)?;
        let (min, max) = (anchors[0], anchors[anchors.len() - 1]);

        self.refine_prepared(&anchors, &f, min, max)
    }

    /// Refine `grid` in place between `min` and `max`.
    ///
    /// See [`OneDGridGenerator::refine_and_evaluate`].
    pub fn refine_in_place<F>(&self, grid: &mut Vec<f64>, f: F, min: f64, max: f64) -> Result<(), GridError>
    where
        F: Fn(f64) -> f64,
    {
        let table = self.refine_and_evaluate(grid, f, min, max)?;
        *grid = table.grid;
        Ok(())
    }

    /// Refine only the part of `grid` between `min` and `max`.
    ///
    /// The range is clipped to the span of `grid` and its limits are
    /// inserted if absent. Points outside it are evaluated and kept
    /// verbatim.
    ///
    /// # Example
    ///
    /// ```
    /// use gridgen_core::math::interpolation::LinLin;
    /// use gridgen_refine::OneDGridGenerator;
    ///
    /// let generator = OneDGridGenerator::<LinLin>::default();
    /// let table = generator.refine_and_evaluate(&[0.0, 1.0, 2.0, 3.0], |x| x * x, 1.0, 2.0).unwrap();
    ///
    /// assert_eq!(&table.grid[..2], &[0.0, 1.0]);
    /// assert_eq!(table.grid.last(), Some(&3.0));
    /// assert!(table.len() > 4);
    /// ```
    pub fn refine_and_evaluate<F>(&self, grid: &[f64], f: F, min: f64, max: f64) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64) -> f64,
    {
        self.try_refine_and_evaluate(grid, |x| Ok(f(x)), min, max)
    }

    /// Fallible variant of [`OneDGridGenerator::refine_and_evaluate`].
    pub fn try_refine_and_evaluate<F>(&self, grid: &[f64], f: F, min: f64, max: f64) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64) -> Result<f64, GridError>,
    {
        if !(min < max) {
            return Err(GridError::invalid_range(min, max));
        }

        let anchors = prepare_anchors(grid)?;
        let lower = min.max(anchors[0]);
        let upper = max.min(anchors[anchors.len() - 1]);
        if !(lower < upper) {
            return Err(GridError::invalid_range(lower, upper));
        }

        self.refine_prepared(&anchors, &f, lower, upper)
    }

    fn refine_prepared<F>(&self, anchors: &[f64], f: &F, lower: f64, upper: f64) -> Result<OneDGrid, GridError>
    where
        F: Fn(f64) -> Result<f64, GridError>,
    {
        self.tolerances.validate()?;

        let mut queue: VecDeque<f64> = iter::once(lower)
            .chain(anchors.iter().copied().filter(|&x| x > lower && x < upper))
            .chain(iter::once(upper))
            .collect();

        if let Some(&x) = queue.iter().find(|&&x| !P::is_indep_valid(x)) {
            return Err(InterpolationError::domain(x, <P::Indep as ProcessingSpace>::NAME).into());
        }

        let mut table = OneDGrid::with_capacity(anchors.len());

        for &x in anchors.iter().take_while(|&&x| x < lower) {
            table.push(x, f(x)?);
        }

        self.refine_queue(&mut queue, f, &mut table)?;

        for &x in anchors.iter().filter(|&&x| x > upper) {
            table.push(x, f(x)?);
        }

        tracing::debug!(
            target: LOG_TARGET,
            policy = %P::KIND,
            points = table.len(),
            "1D grid generated"
        );

        Ok(table)
    }

    /// Bisect every pair in `queue` until it converges.
    fn refine_queue<F>(&self, queue: &mut VecDeque<f64>, f: &F, table: &mut OneDGrid) -> Result<(), GridError>
    where
        F: Fn(f64) -> Result<f64, GridError>,
    {
        let Some(mut x0) = queue.pop_front() else {
            return Ok(());
        };
        let mut y0 = f(x0)?;

        while let Some(&x1) = queue.front() {
            let x_mid = P::midpoint(x0, x1)?;

            let y1 = f(x1)?;
            let y_mid_exact = f(x_mid)?;
            let y_mid_estimated = P::interpolate(x0, x1, x_mid, y0, y1)?;

            if self.has_converged(x0, x_mid, x1, y_mid_estimated, y_mid_exact)? {
                table.push(x0, y0);

                x0 = x1;
                y0 = y1;
                queue.pop_front();
            } else {
                queue.push_front(x_mid);
            }
        }

        table.push(x0, y0);

        Ok(())
    }

    fn has_converged(
        &self,
        x0: f64,
        x_mid: f64,
        x1: f64,
        y_mid_estimated: f64,
        y_mid_exact: f64,
    ) -> Result<bool, GridError> {
        let error = relative_error(y_mid_exact, y_mid_estimated);
        let difference = absolute_difference(y_mid_exact, y_mid_estimated);
        let distance = relative_error(x0, x1);
        let clean = error <= self.tolerances.convergence();

        if distance <= self.tolerances.distance() {
            if !clean {
                self.reporter().report(ConvergenceEvent::DistanceFloor {
                    generator: GeneratorKind::OneD,
                    lower: x0,
                    upper: x1,
                    relative_distance: distance,
                    relative_error: Some(error),
                })?;
            }
            return Ok(true);
        }

        if difference <= self.tolerances.absolute_difference() {
            if !clean {
                self.reporter().report(ConvergenceEvent::AbsoluteDifferenceFloor {
                    generator: GeneratorKind::OneD,
                    lower: x0,
                    upper: x1,
                    midpoint: x_mid,
                    secondary: None,
                    exact: y_mid_exact,
                    estimated: y_mid_estimated,
                    absolute_difference: difference,
                })?;
            }
            return Ok(true);
        }

        Ok(clean)
    }

    fn reporter(&self) -> Reporter<'_> {
        Reporter {
            policy: self.dirty_convergence,
            observer: self.observer.as_ref(),
        }
    }
}

/// Validate anchors and collapse duplicate neighbours.
///
/// Requires at least two ascending points, at least two of them distinct.
pub(crate) fn prepare_anchors(anchors: &[f64]) -> Result<Vec<f64>, GridError> {
    if anchors.len() < 2 {
        return Err(GridError::insufficient_data(anchors.len(), 2));
    }

    if let Some(i) = anchors.windows(2).position(|w| !(w[0] <= w[1])) {
        return Err(GridError::NonMonotonicData { index: i + 1 });
    }

    let mut anchors = anchors.to_vec();
    anchors.dedup();

    if anchors.len() < 2 {
        return Err(GridError::insufficient_data(anchors.len(), 2));
    }

    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingObserver;
    use approx::assert_relative_eq;
    use gridgen_core::math::interpolation::{LinLin, LinLog, LogLin, LogLog};
    use std::cell::Cell;

    fn recording<P: InterpolationPolicy>() -> (OneDGridGenerator<P>, Arc<RecordingObserver>) {
        let recorder = Arc::new(RecordingObserver::new());
        let generator = OneDGridGenerator::<P>::default().with_observer(recorder.clone());
        (generator, recorder)
    }

    // ========================================
    // Anchor validation
    // ========================================

    #[test]
    fn test_prepare_anchors_dedups() {
        assert_eq!(prepare_anchors(&[0.0, 0.0, 1.0, 1.0, 2.0]).unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_prepare_anchors_errors() {
        assert_eq!(prepare_anchors(&[1.0]).unwrap_err(), GridError::insufficient_data(1, 2));
        assert_eq!(prepare_anchors(&[1.0, 1.0]).unwrap_err(), GridError::insufficient_data(1, 2));
        assert_eq!(
            prepare_anchors(&[0.0, 2.0, 1.0]).unwrap_err(),
            GridError::NonMonotonicData { index: 2 }
        );
        assert_eq!(
            prepare_anchors(&[0.0, f64::NAN]).unwrap_err(),
            GridError::NonMonotonicData { index: 1 }
        );
    }

    #[test]
    fn test_preconditions_checked_before_evaluation() {
        let calls = Cell::new(0);
        let generator = OneDGridGenerator::<LinLin>::default();

        let result = generator.generate(&[1.0, 0.0], |x| {
            calls.set(calls.get() + 1);
            x
        });

        assert!(result.unwrap_err().is_precondition());
        assert_eq!(calls.get(), 0);
    }

    // ========================================
    // Reference grids
    // ========================================

    #[test]
    fn test_square_reference_count() {
        let generator = OneDGridGenerator::<LinLin>::default();
        let table = generator.generate_and_evaluate(&[0.0, 10.0], |x| x * x).unwrap();

        assert_eq!(table.len(), 321);
        assert_eq!(table.grid[0], 0.0);
        assert_eq!(table.grid[320], 10.0);
        for (&x, &y) in table.grid.iter().zip(table.values.iter()) {
            assert_eq!(y, x * x);
        }
    }

    #[test]
    fn test_sine_reference_count() {
        let generator = OneDGridGenerator::<LinLin>::default();
        let grid = generator.generate(&[0.0, std::f64::consts::PI], f64::sin).unwrap();
        assert_eq!(grid.len(), 65);
    }

    #[test]
    fn test_representable_functions_keep_anchors() {
        let linear = OneDGridGenerator::<LinLin>::default()
            .generate(&[0.0, 1.0], |x| 3.0 * x + 1.0)
            .unwrap();
        assert_eq!(linear, vec![0.0, 1.0]);

        let exponential = OneDGridGenerator::<LogLin>::default()
            .generate(&[0.0, 1.0], |x| (3.0 * x).exp())
            .unwrap();
        assert_eq!(exponential, vec![0.0, 1.0]);

        let logarithm = OneDGridGenerator::<LinLog>::default()
            .generate(&[1.0, 10.0], f64::ln)
            .unwrap();
        assert_eq!(logarithm, vec![1.0, 10.0]);

        let power = OneDGridGenerator::<LogLog>::default()
            .generate(&[1.0, 100.0], |x| x * x)
            .unwrap();
        assert_eq!(power, vec![1.0, 100.0]);
    }

    // ========================================
    // Dirty convergence
    // ========================================

    #[test]
    fn test_discontinuity_hits_distance_floor_once() {
        let (generator, recorder) = recording::<LinLin>();
        let step = |x: f64| if x < 0.5 { 0.0 } else { 1.0 };

        let grid = generator.generate(&[0.0, 1.0], step).unwrap();
        assert_eq!(grid.len(), 50);

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ConvergenceEvent::DistanceFloor {
                generator,
                lower,
                upper,
                relative_error,
                ..
            } => {
                assert_eq!(*generator, GeneratorKind::OneD);
                assert!(*lower < 0.5 && *upper == 0.5);
                assert!(relative_error.unwrap() > 1e-3);
            }
            other => panic!("Expected DistanceFloor event, got {:?}", other),
        }
    }

    #[test]
    fn test_tiny_values_hit_absolute_floor() {
        let (generator, recorder) = recording::<LinLin>();

        let grid = generator.generate(&[0.0, 10.0], |x| 1e-13 * x * x).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(recorder.len(), 2);
        assert!(recorder.events().iter().all(|e| !e.is_distance_floor()));
    }

    #[test]
    fn test_strict_mode_fails_on_dirty_convergence() {
        let generator = OneDGridGenerator::<LinLin>::default().with_dirty_convergence(DirtyConvergencePolicy::Error);

        match generator.generate(&[0.0, 10.0], |x| 1e-13 * x * x).unwrap_err() {
            GridError::DirtyConvergence(msg) => assert!(msg.contains("absolute difference")),
            other => panic!("Expected DirtyConvergence error, got {:?}", other),
        }

        // Values bounded away from zero never reach either floor
        let grid = generator.generate(&[1.0, 10.0], |x| x * x + 1.0).unwrap();
        assert!(grid.len() > 2);
        assert_eq!((grid[0], grid[grid.len() - 1]), (1.0, 10.0));
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    // ========================================
    // Partial refinement
    // ========================================

    #[test]
    fn test_refine_keeps_points_outside_range() {
        let generator = OneDGridGenerator::<LinLin>::default();
        let mut grid = vec![0.0, 1.0, 5.0, 10.0];

        generator.refine_in_place(&mut grid, |x| x * x, 2.0, 4.0).unwrap();

        assert_eq!(&grid[..2], &[0.0, 1.0]);
        assert_eq!(grid[2], 2.0);
        assert!(grid.contains(&4.0));
        assert_eq!(&grid[grid.len() - 2..], &[5.0, 10.0]);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        assert!(grid.iter().filter(|&&x| x > 2.0 && x < 4.0).count() > 0);
    }

    #[test]
    fn test_refine_clips_range_to_grid() {
        let generator = OneDGridGenerator::<LinLin>::default();
        let clipped = generator.refine_and_evaluate(&[0.0, 10.0], |x| x * x, -5.0, 20.0).unwrap();
        let full = generator.generate_and_evaluate(&[0.0, 10.0], |x| x * x).unwrap();
        assert_eq!(clipped, full);
    }

    #[test]
    fn test_refine_rejects_empty_range() {
        let generator = OneDGridGenerator::<LinLin>::default();
        assert_eq!(
            generator.refine_and_evaluate(&[0.0, 1.0], |x| x, 0.5, 0.5).unwrap_err(),
            GridError::invalid_range(0.5, 0.5)
        );
        assert!(matches!(
            generator.refine_and_evaluate(&[0.0, 1.0], |x| x, 2.0, 3.0).unwrap_err(),
            GridError::InvalidRange { .. }
        ));
    }

    // ========================================
    // Error propagation
    // ========================================

    #[test]
    fn test_log_policy_rejects_non_positive_anchor() {
        let generator = OneDGridGenerator::<LogLog>::default();
        match generator.generate(&[0.0, 1.0], |x| x).unwrap_err() {
            GridError::Interpolation(inner) => assert!(inner.is_domain_error()),
            other => panic!("Expected domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_log_dependent_domain_error_propagates() {
        let generator = OneDGridGenerator::<LogLin>::default();
        let result = generator.generate(&[0.0, 1.0], |x| x - 0.5);
        match result.unwrap_err() {
            GridError::Interpolation(inner) => assert!(inner.is_domain_error()),
            other => panic!("Expected domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluation_error_propagates_unmodified() {
        let generator = OneDGridGenerator::<LinLin>::default();
        let result = generator.try_generate_and_evaluate(&[0.0, 1.0], |x| {
            if x > 0.6 {
                Err(GridError::evaluation("table exhausted"))
            } else {
                Ok(x)
            }
        });
        assert_eq!(result.unwrap_err(), GridError::evaluation("table exhausted"));
    }

    // ========================================
    // Configuration
    // ========================================

    #[test]
    fn test_setters_validate() {
        let mut generator = OneDGridGenerator::<LinLin>::default();

        generator.set_convergence_tolerance(1e-4).unwrap();
        generator.set_absolute_difference_tolerance(1e-14).unwrap();
        generator.set_distance_tolerance(1e-16).unwrap();
        assert_eq!(generator.convergence_tolerance(), 1e-4);
        assert_eq!(generator.absolute_difference_tolerance(), 1e-14);
        assert_eq!(generator.distance_tolerance(), 1e-16);

        assert!(generator.set_convergence_tolerance(0.0).is_err());
        assert_eq!(generator.convergence_tolerance(), 1e-4);

        generator.set_dirty_convergence(DirtyConvergencePolicy::Error);
        assert_eq!(generator.dirty_convergence(), DirtyConvergencePolicy::Error);
    }

    #[test]
    fn test_values_match_evaluated_function() {
        let generator = OneDGridGenerator::<LogLog>::default();
        let table = generator.generate_and_evaluate(&[1.0, 10.0], |x| x.sqrt() + 1.0).unwrap();
        for (&x, &y) in table.grid.iter().zip(table.values.iter()) {
            assert_relative_eq!(y, x.sqrt() + 1.0);
        }
    }
}
