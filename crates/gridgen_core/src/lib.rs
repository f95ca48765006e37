//! # gridgen_core: Interpolation Foundation for Adaptive Grid Generation
//!
//! ## Layer 1 (Foundation) Role
//!
//! gridgen_core is the bottom layer of the workspace, providing:
//! - Processing spaces `Lin` and `Log` (`math::interpolation`)
//! - 1D interpolation policies `LinLin`, `LinLog`, `LogLin`, `LogLog`
//! - Unit-base 2D interpolation policies `LinLinLin` .. `LogLogLog`
//! - Bracketed interpolation on tabulated grids
//! - Relative/absolute error helpers (`math::comparison`)
//! - Error types: `InterpolationError` (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other gridgen_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use gridgen_core::math::comparison::relative_error;
//! use gridgen_core::math::interpolation::{InterpolationPolicy, LinLin, LogLin};
//!
//! // Straight line in Lin-Lin
//! let y = LinLin::interpolate(0.0, 2.0, 1.0, 0.0, 4.0).unwrap();
//! assert_eq!(y, 2.0);
//!
//! // Exponential in Log-Lin
//! let y = LogLin::interpolate(0.0, 1.0, 0.5, 1.0, 4.0).unwrap();
//! assert!(relative_error(y, 2.0) < 1e-14);
//!
//! // Midpoints are taken in the processed space
//! assert_eq!(LinLin::midpoint(2.0, 8.0).unwrap(), 5.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `InterpolationError` and `InterpolationType`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
