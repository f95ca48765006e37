//! Interpolation policies for adaptive grid generation.
//!
//! This module provides the statically dispatched building blocks used by
//! the grid generators in `gridgen_refine`:
//!
//! ## Processing Spaces
//!
//! - [`Lin`]: identity transform
//! - [`Log`]: natural logarithm (rejects non-positive values)
//!
//! ## 1D Policies
//!
//! [`LinLin`], [`LinLog`], [`LogLin`] and [`LogLog`] implement
//! [`InterpolationPolicy`]. Names list the dependent space first.
//!
//! ## 2D Unit-Base Policies
//!
//! [`UnitBasePolicy`] pairs a Z–Y and a Z–X policy. The aliases
//! [`LinLinLin`] through [`LogLogLog`] list spaces in `Z`, `Y`, `X` order.
//!
//! ## Example
//!
//! ```
//! use gridgen_core::math::interpolation::{interpolate_on_grid, LogLog};
//!
//! // y = x^2 sampled on a coarse grid is reproduced exactly under Log-Log
//! let xs = [1.0, 10.0, 100.0];
//! let ys = [1.0, 100.0, 10000.0];
//!
//! let y = interpolate_on_grid::<LogLog, f64>(5.0, &xs, &ys).unwrap();
//! assert!((y - 25.0).abs() < 1e-10);
//! ```

mod grid;
mod policy;
mod space;
mod unit_base;

pub use grid::{find_segment, interpolate_and_process_on_grid, interpolate_on_grid, validate_grid, GRID_FUZZ};
pub use policy::{InterpolationPolicy, InterpolationType, LinLin, LinLog, LogLin, LogLog};
pub use space::{interpolate_in_spaces, Lin, Log, ProcessingSpace};
pub use unit_base::{
    interpolate_unit_base_linear, LinLinLin, LinLinLog, LinLogLin, LinLogLog, LogLinLin, LogLinLog, LogLogLin,
    LogLogLog, TwoDInterpolationPolicy, UnitBasePolicy,
};
