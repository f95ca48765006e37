//! Numerical building blocks for grid generation.
//!
//! - [`comparison`]: relative/absolute error and fuzzy bounds
//! - [`interpolation`]: processing spaces, 1D policies and unit-base 2D policies

pub mod comparison;
pub mod interpolation;
