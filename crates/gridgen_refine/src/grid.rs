//! Generated grid containers.

use crate::error::GridError;
use gridgen_core::math::interpolation::{
    find_segment, interpolate_on_grid, interpolate_unit_base_linear, InterpolationPolicy, TwoDInterpolationPolicy,
};
use gridgen_core::types::InterpolationError;

/// A generated 1D grid with the function evaluated at every point.
///
/// `grid` is strictly ascending and `values[i] = f(grid[i])`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneDGrid {
    /// Grid points in ascending order
    pub grid: Vec<f64>,
    /// Function values at the grid points
    pub values: Vec<f64>,
}

impl OneDGrid {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            grid: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, x: f64, y: f64) {
        self.grid.push(x);
        self.values.push(y);
    }

    /// Number of grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Returns `true` if the grid holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Interpolate the tabulated function at `x` with policy `P`.
    ///
    /// # Example
    ///
    /// ```
    /// use gridgen_core::math::interpolation::LinLin;
    /// use gridgen_refine::{GridTolerances, OneDGridGenerator};
    ///
    /// let generator = OneDGridGenerator::<LinLin>::new(GridTolerances::default());
    /// let table = generator.generate_and_evaluate(&[0.0, 2.0], |x| x * x).unwrap();
    ///
    /// let y = table.evaluate::<LinLin>(1.3).unwrap();
    /// assert!((y - 1.69).abs() / 1.69 < 1e-3);
    /// ```
    pub fn evaluate<P: InterpolationPolicy>(&self, x: f64) -> Result<f64, GridError> {
        Ok(interpolate_on_grid::<P, f64>(x, &self.grid, &self.values)?)
    }
}

/// A generated 2D grid.
///
/// Every primary point owns an ascending secondary grid and the function
/// values along it: `values[i][j] = f(primary[i], secondary[i][j])`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TwoDGrid {
    /// Primary grid points in ascending order
    pub primary: Vec<f64>,
    /// Secondary grid of each primary point
    pub secondary: Vec<Vec<f64>>,
    /// Function values along each secondary grid
    pub values: Vec<Vec<f64>>,
}

impl TwoDGrid {
    #[inline]
    pub(crate) fn push(&mut self, primary: f64, secondary: OneDGrid) {
        self.primary.push(primary);
        self.secondary.push(secondary.grid);
        self.values.push(secondary.values);
    }

    /// Number of primary grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Returns `true` if the grid holds no primary points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Total number of `(primary, secondary)` nodes.
    pub fn node_count(&self) -> usize {
        self.secondary.iter().map(Vec::len).sum()
    }

    /// Unit-base interpolation of the tabulated function at `(x, y)`.
    ///
    /// `P` should be the policy the grid was generated with.
    ///
    /// # Errors
    ///
    /// * [`GridError::InsufficientData`] - fewer than 2 primary points
    /// * [`GridError::Interpolation`] - `(x, y)` lies outside the table, or a
    ///   secondary grid is malformed
    pub fn evaluate<P: TwoDInterpolationPolicy>(&self, x: f64, y: f64) -> Result<f64, GridError> {
        let i = self.bracket(x)?;
        Ok(P::interpolate_unit_base(
            self.primary[i],
            self.primary[i + 1],
            x,
            y,
            &self.secondary[i],
            &self.values[i],
            &self.secondary[i + 1],
            &self.values[i + 1],
        )?)
    }

    /// Raw-span unit-base interpolation, for grids produced by the
    /// bilinear generator.
    pub fn evaluate_linear(&self, x: f64, y: f64) -> Result<f64, GridError> {
        let i = self.bracket(x)?;
        Ok(interpolate_unit_base_linear(
            self.primary[i],
            self.primary[i + 1],
            x,
            y,
            &self.secondary[i],
            &self.values[i],
            &self.secondary[i + 1],
            &self.values[i + 1],
        )?)
    }

    fn bracket(&self, x: f64) -> Result<usize, GridError> {
        let n = self.primary.len();
        if n < 2 {
            return Err(GridError::insufficient_data(n, 2));
        }
        if self.secondary.len() != n || self.values.len() != n {
            return Err(InterpolationError::InvalidInput(format!(
                "expected {} secondary grids and value rows, got {} and {}",
                n,
                self.secondary.len(),
                self.values.len()
            ))
            .into());
        }

        let (min, max) = (self.primary[0], self.primary[n - 1]);
        if !(min..=max).contains(&x) {
            return Err(InterpolationError::OutOfBounds { x, min, max }.into());
        }

        Ok(find_segment(&self.primary, x))
    }
}
