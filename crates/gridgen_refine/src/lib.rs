//! # gridgen_refine: Adaptive Grid Generation
//!
//! ## Layer 2 (Refinement) Role
//!
//! Builds tabulation grids for arbitrary functions by bisecting adjacent
//! points until interpolation under a chosen policy reproduces the
//! function within tolerance. Depends on `gridgen_core` (L1) for the
//! interpolation policies.
//!
//! ## Modules
//!
//! - `one_d`: `OneDGridGenerator` for `f(x)`
//! - `two_d`: `TwoDGridGenerator` for `f(x, y)` with per-point secondary grids
//! - `bilinear`: `BilinearGridGenerator` for primary-dependent secondary ranges
//! - `config`: `GridTolerances` and `DirtyConvergencePolicy`
//! - `diagnostics`: convergence events and observers
//!
//! ## Example
//!
//! ```rust
//! use gridgen_core::math::interpolation::LinLin;
//! use gridgen_refine::{GridTolerances, OneDGridGenerator};
//!
//! let generator = OneDGridGenerator::<LinLin>::new(GridTolerances::default());
//! let table = generator.generate_and_evaluate(&[0.0, std::f64::consts::PI], f64::sin).unwrap();
//!
//! assert_eq!(table.len(), 65);
//! assert!(table.grid.windows(2).all(|w| w[0] < w[1]));
//! ```
//!
//! ## Logging
//!
//! Every generator logs under the `gridgen::refine` target. Dirty
//! convergence is reported at WARN by the default observer, committed 2D
//! primary points at DEBUG and individual 2D checks at TRACE.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for tolerances, diagnostics, errors and
//!   generated grids

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod bilinear;
pub mod config;
pub mod diagnostics;
pub mod one_d;
pub mod two_d;

mod error;
mod grid;

pub use bilinear::BilinearGridGenerator;
pub use config::{DirtyConvergencePolicy, GridTolerances};
pub use error::GridError;
pub use grid::{OneDGrid, TwoDGrid};
pub use one_d::OneDGridGenerator;
pub use two_d::{FixedSecondaryGrid, SecondaryGridSeed, TwoDGridGenerator};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::diagnostics::{ConvergenceEvent, ConvergenceObserver, RecordingObserver, TracingObserver};
    pub use crate::{
        BilinearGridGenerator, DirtyConvergencePolicy, FixedSecondaryGrid, GridError, GridTolerances, OneDGrid,
        OneDGridGenerator, SecondaryGridSeed, TwoDGrid, TwoDGridGenerator,
    };
}
