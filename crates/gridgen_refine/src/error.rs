//! Grid generation error types.
//!
//! Precondition violations are reported before any function evaluation.
//! Errors raised by the policy layer are wrapped unmodified in
//! [`GridError::Interpolation`].

use gridgen_core::types::InterpolationError;
use thiserror::Error;

/// Errors that can occur during adaptive grid generation.
///
/// # Variants
///
/// - `InvalidTolerance`: A tolerance lies outside its valid range
/// - `InsufficientData`: Fewer than two distinct grid points were supplied
/// - `NonMonotonicData`: The supplied grid points are not ascending
/// - `InvalidRange`: An empty or inverted range was requested
/// - `DirtyConvergence`: A weak tolerance preempted convergence in strict mode
/// - `Evaluation`: The gridded function failed
/// - `Interpolation`: Wrapped error from the policy layer
///
/// # Examples
///
/// ```
/// use gridgen_refine::GridError;
///
/// let err = GridError::invalid_range(2.0, 1.0);
/// assert!(format!("{}", err).contains("[2, 1]"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridError {
    /// A tolerance lies outside its valid range.
    #[error("Invalid {name} tolerance {value}: must lie in {range}")]
    InvalidTolerance {
        /// Name of the tolerance
        name: String,
        /// The rejected value
        value: f64,
        /// Valid range in interval notation
        range: String,
    },

    /// Fewer grid points than required.
    #[error("Insufficient grid points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of distinct points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Grid points are not sorted in ascending order.
    #[error("Grid points are not ascending at index {index}")]
    NonMonotonicData {
        /// Index of the first point smaller than its predecessor
        index: usize,
    },

    /// Empty or inverted range.
    #[error("Invalid range [{min}, {max}]: lower limit must be below upper limit")]
    InvalidRange {
        /// Lower limit
        min: f64,
        /// Upper limit
        max: f64,
    },

    /// Distance or absolute-difference tolerance reached before the
    /// convergence tolerance while dirty convergence is an error.
    #[error("Dirty convergence: {0}")]
    DirtyConvergence(String),

    /// The gridded function could not be evaluated.
    #[error("Function evaluation failed: {0}")]
    Evaluation(String),

    /// Wrapped interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}

impl GridError {
    /// Create an invalid tolerance error.
    pub fn invalid_tolerance(name: impl Into<String>, value: f64, range: impl Into<String>) -> Self {
        Self::InvalidTolerance {
            name: name.into(),
            value,
            range: range.into(),
        }
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(got: usize, need: usize) -> Self {
        Self::InsufficientData { got, need }
    }

    /// Create an invalid range error.
    pub fn invalid_range(min: f64, max: f64) -> Self {
        Self::InvalidRange { min, max }
    }

    /// Create a function evaluation error.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation(message.into())
    }

    /// Returns `true` if a precondition was violated.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidTolerance { .. }
                | Self::InsufficientData { .. }
                | Self::NonMonotonicData { .. }
                | Self::InvalidRange { .. }
        )
    }
}
