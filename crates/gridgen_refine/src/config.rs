//! Grid generation configuration types.
//!
//! This module provides the tolerance set that governs refinement
//! termination and the policy applied when a weak tolerance preempts
//! convergence.

use crate::error::GridError;

/// Default convergence tolerance.
pub const DEFAULT_CONVERGENCE_TOLERANCE: f64 = 1e-3;
/// Default absolute difference tolerance.
pub const DEFAULT_ABSOLUTE_DIFFERENCE_TOLERANCE: f64 = 1e-12;
/// Default distance tolerance.
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 1e-14;

/// Tolerances governing refinement termination.
///
/// Two adjacent grid points are accepted when any one of the following
/// holds, checked in this order:
///
/// 1. their relative separation is at most `distance`
/// 2. the absolute midpoint error is at most `absolute_difference`
/// 3. the relative midpoint error is at most `convergence`
///
/// Only the last one is clean convergence; the first two are reported as
/// diagnostics when they preempt it.
///
/// # Valid ranges
///
/// - `convergence`: `(0, 1]`
/// - `absolute_difference`: `[0, 1]`
/// - `distance`: `[0, 1]`
///
/// A `distance` of zero removes the only guaranteed terminator for a
/// function that never converges (e.g. across a discontinuity).
///
/// # Examples
///
/// ```
/// use gridgen_refine::GridTolerances;
///
/// let tolerances = GridTolerances::default();
/// assert_eq!(tolerances.convergence(), 1e-3);
///
/// let custom = GridTolerances::new(1e-4, 1e-12, 1e-14).unwrap();
/// assert_eq!(custom.convergence(), 1e-4);
///
/// assert!(GridTolerances::new(0.0, 1e-12, 1e-14).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridTolerances {
    convergence: f64,
    absolute_difference: f64,
    distance: f64,
}

impl Default for GridTolerances {
    /// Default values:
    /// - `convergence`: 1e-3
    /// - `absolute_difference`: 1e-12
    /// - `distance`: 1e-14
    fn default() -> Self {
        Self {
            convergence: DEFAULT_CONVERGENCE_TOLERANCE,
            absolute_difference: DEFAULT_ABSOLUTE_DIFFERENCE_TOLERANCE,
            distance: DEFAULT_DISTANCE_TOLERANCE,
        }
    }
}

impl GridTolerances {
    /// Create a validated tolerance set.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTolerance`] naming the first value that
    /// lies outside its range.
    pub fn new(convergence: f64, absolute_difference: f64, distance: f64) -> Result<Self, GridError> {
        let tolerances = Self {
            convergence,
            absolute_difference,
            distance,
        };
        tolerances.validate()?;
        Ok(tolerances)
    }

    /// Tight tolerances for reference-quality grids.
    ///
    /// (1e-5, 1e-14, 1e-16)
    pub fn strict() -> Self {
        Self {
            convergence: 1e-5,
            absolute_difference: 1e-14,
            distance: 1e-16,
        }
    }

    /// Relaxed tolerances for quick, compact grids.
    ///
    /// (1e-2, 1e-10, 1e-12)
    pub fn coarse() -> Self {
        Self {
            convergence: 1e-2,
            absolute_difference: 1e-10,
            distance: 1e-12,
        }
    }

    /// Check every tolerance against its valid range.
    pub fn validate(&self) -> Result<(), GridError> {
        validate_convergence(self.convergence)?;
        validate_unit_interval("absolute difference", self.absolute_difference)?;
        validate_unit_interval("distance", self.distance)
    }

    /// Maximum relative midpoint error for clean convergence.
    #[inline]
    pub fn convergence(&self) -> f64 {
        self.convergence
    }

    /// Absolute midpoint error below which refinement stops.
    #[inline]
    pub fn absolute_difference(&self) -> f64 {
        self.absolute_difference
    }

    /// Relative point separation below which refinement stops.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Replace the convergence tolerance.
    pub fn with_convergence(mut self, convergence: f64) -> Result<Self, GridError> {
        validate_convergence(convergence)?;
        self.convergence = convergence;
        Ok(self)
    }

    /// Replace the absolute difference tolerance.
    pub fn with_absolute_difference(mut self, absolute_difference: f64) -> Result<Self, GridError> {
        validate_unit_interval("absolute difference", absolute_difference)?;
        self.absolute_difference = absolute_difference;
        Ok(self)
    }

    /// Replace the distance tolerance.
    pub fn with_distance(mut self, distance: f64) -> Result<Self, GridError> {
        validate_unit_interval("distance", distance)?;
        self.distance = distance;
        Ok(self)
    }
}

fn validate_convergence(value: f64) -> Result<(), GridError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(GridError::invalid_tolerance("convergence", value, "(0, 1]"))
    }
}

fn validate_unit_interval(name: &str, value: f64) -> Result<(), GridError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GridError::invalid_tolerance(name, value, "[0, 1]"))
    }
}

/// What to do when the distance or absolute difference tolerance is
/// reached before the convergence tolerance ("dirty convergence").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DirtyConvergencePolicy {
    /// Accept the pair and notify the convergence observer (default).
    #[default]
    Warn,

    /// Notify the convergence observer, then abort generation with
    /// [`GridError::DirtyConvergence`].
    Error,
}
