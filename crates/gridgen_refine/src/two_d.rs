//! Two-dimensional adaptive grid generation.
//!
//! Every primary grid point owns a secondary grid produced by an embedded
//! [`OneDGridGenerator`]. Adjacent primary points are accepted once the
//! secondary grid generated at their primary midpoint is reproduced by
//! unit-base interpolation between the two bracketing secondary grids.
//! The check runs at every midpoint node and between every pair of
//! midpoint nodes, and stops at the first failing point.

use crate::config::{DirtyConvergencePolicy, GridTolerances};
use crate::diagnostics::{ConvergenceEvent, ConvergenceObserver, GeneratorKind, Reporter, LOG_TARGET};
use crate::error::GridError;
use crate::grid::{OneDGrid, TwoDGrid};
use crate::one_d::{prepare_anchors, OneDGridGenerator};
use gridgen_core::math::comparison::{absolute_difference, relative_error};
use gridgen_core::math::interpolation::{InterpolationPolicy, ProcessingSpace, TwoDInterpolationPolicy};
use gridgen_core::types::InterpolationError;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Provides the initial secondary grid at a primary value.
///
/// Closures `Fn(f64) -> Vec<f64>` implement this trait, so the seed may
/// depend on the primary value.
pub trait SecondaryGridSeed {
    /// Initial (unrefined) secondary grid at `primary`.
    fn seed(&self, primary: f64) -> Vec<f64>;
}

impl<F> SecondaryGridSeed for F
where
    F: Fn(f64) -> Vec<f64>,
{
    fn seed(&self, primary: f64) -> Vec<f64> {
        self(primary)
    }
}

/// The same secondary seed at every primary value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedSecondaryGrid(Vec<f64>);

impl FixedSecondaryGrid {
    /// Create a seed from at least two ascending points.
    ///
    /// Duplicate neighbours are collapsed.
    pub fn new(points: Vec<f64>) -> Result<Self, GridError> {
        Ok(Self(prepare_anchors(&points)?))
    }

    /// Seed points.
    pub fn points(&self) -> &[f64] {
        &self.0
    }
}

impl SecondaryGridSeed for FixedSecondaryGrid {
    fn seed(&self, _primary: f64) -> Vec<f64> {
        self.0.clone()
    }
}

/// Unit-base estimate of `f(x, y)` from the secondary grids at `x0` and `x1`.
pub(crate) type UnitBaseEstimator =
    fn(f64, f64, f64, f64, &[f64], &[f64], &[f64], &[f64]) -> Result<f64, InterpolationError>;

/// Primary-axis refinement shared by the 2D and bilinear generators.
///
/// `secondary` produces the refined, evaluated secondary grid at a primary
/// value and `f` is the gridded function.
pub(crate) struct PrimaryRefinement<'a, P, S, F> {
    pub(crate) kind: GeneratorKind,
    pub(crate) tolerances: GridTolerances,
    pub(crate) reporter: Reporter<'a>,
    pub(crate) estimator: UnitBaseEstimator,
    pub(crate) secondary: S,
    pub(crate) f: &'a F,
    pub(crate) _policy: PhantomData<P>,
}

impl<P, S, F> PrimaryRefinement<'_, P, S, F>
where
    P: TwoDInterpolationPolicy,
    S: Fn(f64) -> Result<OneDGrid, GridError>,
    F: Fn(f64, f64) -> Result<f64, GridError>,
{
    pub(crate) fn run(&self, mut queue: VecDeque<f64>) -> Result<TwoDGrid, GridError> {
        let mut table = TwoDGrid::default();

        let Some(mut x0) = queue.pop_front() else {
            return Ok(table);
        };
        let mut secondary_0 = (self.secondary)(x0)?;

        while let Some(&x1) = queue.front() {
            let secondary_1 = (self.secondary)(x1)?;

            if self.has_converged(x0, x1, &secondary_0, &secondary_1)? {
                self.commit(&mut table, x0, secondary_0);

                x0 = x1;
                secondary_0 = secondary_1;
                queue.pop_front();
            } else {
                queue.push_front(P::primary_midpoint(x0, x1)?);
            }
        }

        self.commit(&mut table, x0, secondary_0);

        Ok(table)
    }

    fn commit(&self, table: &mut TwoDGrid, primary: f64, secondary: OneDGrid) {
        tracing::debug!(
            target: LOG_TARGET,
            generator = %self.kind,
            primary,
            secondary_points = secondary.len(),
            "primary grid point committed"
        );
        table.push(primary, secondary);
    }

    fn has_converged(&self, x0: f64, x1: f64, secondary_0: &OneDGrid, secondary_1: &OneDGrid) -> Result<bool, GridError> {
        let distance = relative_error(x0, x1);
        if distance <= self.tolerances.distance() {
            self.reporter.report(ConvergenceEvent::DistanceFloor {
                generator: self.kind,
                lower: x0,
                upper: x1,
                relative_distance: distance,
                relative_error: None,
            })?;
            return Ok(true);
        }

        let x_mid = P::primary_midpoint(x0, x1)?;
        let mid = (self.secondary)(x_mid)?;

        let bracket = Bracket {
            x0,
            x1,
            x_mid,
            secondary_0,
            secondary_1,
        };

        for i in 0..mid.len() {
            if !self.check_point(&bracket, mid.grid[i], mid.values[i])? {
                return Ok(false);
            }

            if i + 1 < mid.len() {
                let y = P::secondary_midpoint(mid.grid[i], mid.grid[i + 1])?;
                let exact = (self.f)(x_mid, y)?;

                if !self.check_point(&bracket, y, exact)? {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    fn check_point(&self, bracket: &Bracket<'_>, y: f64, exact: f64) -> Result<bool, GridError> {
        let estimated = match (self.estimator)(
            bracket.x0,
            bracket.x1,
            bracket.x_mid,
            y,
            &bracket.secondary_0.grid,
            &bracket.secondary_0.values,
            &bracket.secondary_1.grid,
            &bracket.secondary_1.values,
        ) {
            Ok(estimated) => estimated,
            // Midpoint grid reaches outside the intermediate grid
            Err(InterpolationError::OutOfBounds { .. }) => {
                tracing::trace!(
                    target: LOG_TARGET,
                    generator = %self.kind,
                    primary = bracket.x_mid,
                    secondary = y,
                    "secondary value outside intermediate grid"
                );
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let error = relative_error(exact, estimated);
        let difference = absolute_difference(exact, estimated);

        tracing::trace!(
            target: LOG_TARGET,
            generator = %self.kind,
            primary = bracket.x_mid,
            secondary = y,
            exact,
            estimated,
            relative_error = error,
            "secondary convergence check"
        );

        if error > self.tolerances.convergence() {
            if difference > self.tolerances.absolute_difference() {
                return Ok(false);
            }

            self.reporter.report(ConvergenceEvent::AbsoluteDifferenceFloor {
                generator: self.kind,
                lower: bracket.x0,
                upper: bracket.x1,
                midpoint: bracket.x_mid,
                secondary: Some(y),
                exact,
                estimated,
                absolute_difference: difference,
            })?;
        }

        Ok(true)
    }
}

struct Bracket<'a> {
    x0: f64,
    x1: f64,
    x_mid: f64,
    secondary_0: &'a OneDGrid,
    secondary_1: &'a OneDGrid,
}

/// Merge extra primary values into validated anchors.
pub(crate) fn merge_primary_values(anchors: &[f64], extra: &[f64]) -> Result<Vec<f64>, GridError> {
    let mut primary = prepare_anchors(anchors)?;

    if !extra.is_empty() {
        primary.extend_from_slice(extra);
        primary.sort_by(f64::total_cmp);
        primary.dedup();
    }

    Ok(primary)
}

/// Fail unless every primary value lies in the primary policy's domain.
pub(crate) fn check_primary_domain<P: InterpolationPolicy>(primary: &[f64]) -> Result<(), GridError> {
    match primary.iter().find(|&&x| !P::is_indep_valid(x)) {
        Some(&x) => Err(InterpolationError::domain(x, <P::Indep as ProcessingSpace>::NAME).into()),
        None => Ok(()),
    }
}

/// Adaptive 2D grid generator for unit-base policy `P`.
///
/// Dirty-convergence policy, tolerances and observer are shared with the
/// embedded secondary generator: setters on this type update both.
///
/// # Examples
///
/// ```
/// use gridgen_core::math::interpolation::LinLinLin;
/// use gridgen_refine::{DirtyConvergencePolicy, FixedSecondaryGrid, GridTolerances, TwoDGridGenerator};
///
/// let seed = FixedSecondaryGrid::new(vec![1.0, 10.0, 20.0]).unwrap();
/// let generator = TwoDGridGenerator::<LinLinLin, _>::new(seed, GridTolerances::default())
///     .with_dirty_convergence(DirtyConvergencePolicy::Error);
///
/// let table = generator.generate_and_evaluate(&[0.0, 10.0, 20.0], |x, y| x + y).unwrap();
/// assert_eq!(table.primary, vec![0.0, 10.0, 20.0]);
/// assert_eq!(table.secondary[1], vec![1.0, 10.0, 20.0]);
/// ```
#[derive(Clone)]
pub struct TwoDGridGenerator<P: TwoDInterpolationPolicy, S: SecondaryGridSeed = FixedSecondaryGrid> {
    seed: S,
    secondary_generator: OneDGridGenerator<P::Secondary>,
    critical_primary_values: Vec<f64>,
    _policy: PhantomData<P>,
}

impl<P: TwoDInterpolationPolicy, S: SecondaryGridSeed> fmt::Debug for TwoDGridGenerator<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoDGridGenerator")
            .field("policy", &P::default())
            .field("tolerances", &self.tolerances())
            .field("dirty_convergence", &self.dirty_convergence())
            .field("critical_primary_values", &self.critical_primary_values)
            .finish_non_exhaustive()
    }
}

impl<P: TwoDInterpolationPolicy, S: SecondaryGridSeed> TwoDGridGenerator<P, S> {
    /// Create a generator seeding secondary grids from `seed`.
    pub fn new(seed: S, tolerances: GridTolerances) -> Self {
        Self {
            seed,
            secondary_generator: OneDGridGenerator::new(tolerances),
            critical_primary_values: Vec::new(),
            _policy: PhantomData,
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

    /// Primary values always present in generated grids.
    ///
    /// They are merged into the anchors before refinement. Values outside
    /// the anchor span extend the primary range.
    pub fn with_critical_primary_values(mut self, values: Vec<f64>) -> Self {
        self.critical_primary_values = values;
        self
    }

    /// Embedded secondary generator.
    pub fn secondary_generator(&self) -> &OneDGridGenerator<P::Secondary> {
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

    /// Replace the whole tolerance set.
    pub fn set_tolerances(&mut self, tolerances: GridTolerances) -> Result<(), GridError> {
        self.secondary_generator.set_tolerances(tolerances)
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

    /// Generate a 2D grid for a fallible function.
    ///
    /// The first evaluation error aborts generation and is returned
    /// unmodified.
    pub fn try_generate_and_evaluate<F>(&self, anchors: &[f64], f: F) -> Result<TwoDGrid, GridError>
    where
        F: Fn(f64, f64) -> Result<f64, GridError>,
    {
        let tolerances = self.tolerances();
        tolerances.validate()?;

        let primary = merge_primary_values(anchors, &self.critical_primary_values)?;
        check_primary_domain::<P::Primary>(&primary)?;

        let observer = self.secondary_generator.observer();
        let refinement = PrimaryRefinement {
            kind: GeneratorKind::TwoD,
            tolerances,
            reporter: Reporter {
                policy: self.dirty_convergence(),
                observer: observer.as_ref(),
            },
            estimator: P::interpolate_unit_base::<f64>,
            secondary: |x: f64| self.try_generate_secondary(x, &f),
            f: &f,
            _policy: PhantomData::<P>,
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
        self.secondary_generator
            .try_generate_and_evaluate(&self.seed.seed(primary), |y| f(primary, y))
    }
}
