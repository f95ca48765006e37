//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for interpolation policies and grid lookups
//!
//! # Re-exports
//!
//! - [`InterpolationError`] from `error`

pub mod error;

pub use error::InterpolationError;
