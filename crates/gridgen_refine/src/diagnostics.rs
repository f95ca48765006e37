//! Convergence diagnostics.
//!
//! When the distance or absolute difference tolerance accepts a pair of
//! grid points before the convergence tolerance is met, the generator
//! emits a [`ConvergenceEvent`] to its [`ConvergenceObserver`]. The
//! observer sees every event. Generation then continues, unless the
//! generator is configured with [`DirtyConvergencePolicy::Error`], in which
//! case it stops with the event as its error.
//!
//! # Observers
//!
//! - [`TracingObserver`]: `tracing::warn!` under target `gridgen::refine` (default)
//! - [`RecordingObserver`]: collects events in memory
//! - [`SilentObserver`]: discards events

use crate::config::DirtyConvergencePolicy;
use crate::error::GridError;
use std::fmt;
use std::sync::{Arc, Mutex};

/// `tracing` target used by every generator.
pub const LOG_TARGET: &str = "gridgen::refine";

/// Generator that emitted a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratorKind {
    /// One-dimensional generator
    OneD,
    /// Two-dimensional generator
    TwoD,
    /// Bilinear generator
    Bilinear,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorKind::OneD => "Grid Generator",
            GeneratorKind::TwoD => "2D Grid Generator",
            GeneratorKind::Bilinear => "Bilinear Grid Generator",
        };
        write!(f, "{}", name)
    }
}

/// A weak tolerance accepted a pair of points before convergence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvergenceEvent {
    /// The distance tolerance was reached.
    DistanceFloor {
        /// Emitting generator
        generator: GeneratorKind,
        /// Lower point of the accepted pair
        lower: f64,
        /// Upper point of the accepted pair
        upper: f64,
        /// Relative separation of the pair
        relative_distance: f64,
        /// Relative midpoint error, when one was computed
        relative_error: Option<f64>,
    },

    /// The absolute difference tolerance was reached.
    AbsoluteDifferenceFloor {
        /// Emitting generator
        generator: GeneratorKind,
        /// Lower point of the accepted pair
        lower: f64,
        /// Upper point of the accepted pair
        upper: f64,
        /// Point at which the check was made
        midpoint: f64,
        /// Secondary value of the check (2D generators only)
        secondary: Option<f64>,
        /// Exact function value
        exact: f64,
        /// Interpolated estimate
        estimated: f64,
        /// `|exact - estimated|`
        absolute_difference: f64,
    },
}

impl ConvergenceEvent {
    /// Generator that emitted the event.
    pub fn generator(&self) -> GeneratorKind {
        match self {
            ConvergenceEvent::DistanceFloor { generator, .. }
            | ConvergenceEvent::AbsoluteDifferenceFloor { generator, .. } => *generator,
        }
    }

    /// Returns `true` for [`ConvergenceEvent::DistanceFloor`].
    pub fn is_distance_floor(&self) -> bool {
        matches!(self, ConvergenceEvent::DistanceFloor { .. })
    }
}

impl fmt::Display for ConvergenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceEvent::DistanceFloor {
                generator,
                lower,
                upper,
                relative_distance,
                relative_error,
            } => {
                write!(
                    f,
                    "{}: distance tolerance hit before convergence - relError({:.18e}, {:.18e}) = {:e}",
                    generator, lower, upper, relative_distance
                )?;
                if let Some(err) = relative_error {
                    write!(f, ", midpoint relative error = {:e}", err)?;
                }
                Ok(())
            }
            ConvergenceEvent::AbsoluteDifferenceFloor {
                generator,
                lower,
                upper,
                midpoint,
                secondary,
                exact,
                estimated,
                absolute_difference,
            } => {
                write!(
                    f,
                    "{}: absolute difference tolerance hit before convergence - x0={:.18e}, x1={:.18e}, x_mid={:.18e}",
                    generator, lower, upper, midpoint
                )?;
                if let Some(y) = secondary {
                    write!(f, ", secondary={:.18e}", y)?;
                }
                write!(
                    f,
                    ", exact={:e}, estimated={:e}, abs_diff={:e}",
                    exact, estimated, absolute_difference
                )
            }
        }
    }
}

/// Receiver of convergence diagnostics.
///
/// Observers are shared between a 2D generator and its embedded 1D
/// generator, so implementations must be thread-safe.
pub trait ConvergenceObserver: Send + Sync {
    /// Handle a single diagnostic.
    fn on_event(&self, event: &ConvergenceEvent);
}

/// Emits every event as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConvergenceObserver for TracingObserver {
    fn on_event(&self, event: &ConvergenceEvent) {
        match event {
            ConvergenceEvent::DistanceFloor {
                generator,
                lower,
                upper,
                relative_distance,
                relative_error,
            } => tracing::warn!(
                target: LOG_TARGET,
                generator = %generator,
                lower,
                upper,
                relative_distance,
                relative_error = ?relative_error,
                "distance tolerance hit before convergence"
            ),
            ConvergenceEvent::AbsoluteDifferenceFloor {
                generator,
                lower,
                upper,
                midpoint,
                secondary,
                exact,
                estimated,
                absolute_difference,
            } => tracing::warn!(
                target: LOG_TARGET,
                generator = %generator,
                lower,
                upper,
                midpoint,
                secondary = ?secondary,
                exact,
                estimated,
                absolute_difference,
                "absolute difference tolerance hit before convergence"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ConvergenceObserver for SilentObserver {
    fn on_event(&self, _event: &ConvergenceEvent) {}
}

/// Collects events in memory.
///
/// # Examples
///
/// ```
/// use gridgen_refine::diagnostics::RecordingObserver;
/// use gridgen_refine::{GridTolerances, OneDGridGenerator};
/// use gridgen_core::math::interpolation::LinLin;
/// use std::sync::Arc;
///
/// let recorder = Arc::new(RecordingObserver::new());
/// let generator = OneDGridGenerator::<LinLin>::new(GridTolerances::default())
///     .with_observer(recorder.clone());
///
/// // Values this small hit the absolute difference floor
/// generator.generate(&[0.0, 10.0], |x| 1e-13 * x * x).unwrap();
/// assert!(!recorder.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ConvergenceEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<ConvergenceEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ConvergenceEvent>> {
        // Poisoned locks still hold valid events
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConvergenceObserver for RecordingObserver {
    fn on_event(&self, event: &ConvergenceEvent) {
        self.lock().push(event.clone());
    }
}

/// Default observer shared by new generators.
pub(crate) fn default_observer() -> Arc<dyn ConvergenceObserver> {
    Arc::new(TracingObserver)
}

/// Routes dirty-convergence events according to the configured policy.
#[derive(Clone, Copy)]
pub(crate) struct Reporter<'a> {
    pub(crate) policy: DirtyConvergencePolicy,
    pub(crate) observer: &'a dyn ConvergenceObserver,
}

impl Reporter<'_> {
    /// Notify the observer, then fail in strict mode.
    pub(crate) fn report(&self, event: ConvergenceEvent) -> Result<(), GridError> {
        self.observer.on_event(&event);
        match self.policy {
            DirtyConvergencePolicy::Warn => Ok(()),
            DirtyConvergencePolicy::Error => Err(GridError::DirtyConvergence(event.to_string())),
        }
    }
}
