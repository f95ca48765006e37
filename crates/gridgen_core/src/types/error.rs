//! Error types for structured error handling.
//!
//! This module provides:
//! - `InterpolationError`: Errors from interpolation policies and tabulated-grid lookups

use thiserror::Error;

/// Interpolation operation errors.
///
/// Raised by the policy layer when a value falls outside the domain of a
/// processing space (e.g. a non-positive argument to a logarithmic policy)
/// and by tabulated-grid lookups when a query cannot be bracketed.
///
/// # Examples
/// ```
/// use gridgen_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Data is not monotonic when monotonicity is required.
    #[error("Data is not monotonic at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Value cannot be mapped into a processing space.
    #[error("Value {value} is outside the domain of the {space} processing space")]
    Domain {
        /// The offending value
        value: f64,
        /// Name of the processing space that rejected it
        space: String,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl InterpolationError {
    /// Build a domain error for `value` rejected by `space`.
    pub fn domain(value: f64, space: &str) -> Self {
        InterpolationError::Domain {
            value,
            space: space.to_string(),
        }
    }

    /// Returns `true` if this error was raised by a processing space.
    #[inline]
    pub fn is_domain_error(&self) -> bool {
        matches!(self, InterpolationError::Domain { .. })
    }
}
