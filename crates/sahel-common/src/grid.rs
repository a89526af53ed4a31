//! Raster grid representation.

use serde::{Deserialize, Serialize};

use crate::{SahelError, SahelResult};

/// One data type's raster for one calendar year.
///
/// Values are stored row-major, top-to-bottom. A grid never changes after
/// construction; blended and transitional grids are always new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
    declared_min: Option<f32>,
    declared_max: Option<f32>,
}

impl RasterGrid {
    /// Create a grid, checking that `values.len() == width * height`.
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> SahelResult<Self> {
        if width == 0 || height == 0 {
            return Err(SahelError::invalid_grid(format!(
                "dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if values.len() != width * height {
            return Err(SahelError::invalid_grid(format!(
                "{}x{} grid needs {} values, got {}",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
            declared_min: None,
            declared_max: None,
        })
    }

    /// Attach the bounds declared by the raster's publisher.
    pub fn with_declared_range(mut self, min: Option<f32>, max: Option<f32>) -> Self {
        self.declared_min = min;
        self.declared_max = max;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn declared_min(&self) -> Option<f32> {
        self.declared_min
    }

    pub fn declared_max(&self) -> Option<f32> {
        self.declared_max
    }

    /// Both declared bounds, if the raster carries them.
    pub fn declared_range(&self) -> Option<(f32, f32)> {
        self.declared_min.zip(self.declared_max)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Grids always hold at least one cell.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the value at a grid coordinate.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Whether two grids have identical dimensions.
    pub fn same_shape(&self, other: &RasterGrid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Build a new grid of the same shape and declared bounds from `values`.
    pub fn derive(&self, values: Vec<f32>) -> SahelResult<Self> {
        Ok(Self::new(self.width, self.height, values)?
            .with_declared_range(self.declared_min, self.declared_max))
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}
