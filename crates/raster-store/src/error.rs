//! Error types for raster loading and interpolation.

use sahel_common::{DataType, SahelError, Year, YearRange};
use thiserror::Error;

/// Errors that can occur while loading, caching or blending rasters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Fetching a single year's raster failed.
    #[error("failed to load {data_type} for {year}: {reason}")]
    LoadFailed {
        data_type: DataType,
        year: Year,
        reason: String,
    },

    /// The raster bytes could not be decoded.
    #[error("failed to decode raster: {0}")]
    Decode(String),

    /// Two grids that must line up cell-for-cell do not.
    #[error("grid shape mismatch: {left} cells vs {right} cells")]
    ShapeMismatch { left: usize, right: usize },

    /// The requested year has no published raster for the data type.
    #[error("year {year} is outside the {range} range for {data_type}")]
    YearOutOfRange {
        data_type: DataType,
        year: Year,
        range: YearRange,
    },

    /// No cached grid and no fallback year for a render request.
    #[error("no raster available for {data_type} at {year}")]
    MissingGrid { data_type: DataType, year: f64 },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid grid contents.
    #[error(transparent)]
    Grid(#[from] SahelError),
}

impl StoreError {
    /// Create a LoadFailed error.
    pub fn load_failed(data_type: DataType, year: Year, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            data_type,
            year,
            reason: reason.into(),
        }
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a ShapeMismatch error from two cell counts.
    pub fn shape_mismatch(left: usize, right: usize) -> Self {
        Self::ShapeMismatch { left, right }
    }

    /// Whether this error only affects one year's raster and should be
    /// recovered from by skipping that year.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::LoadFailed { .. } | Self::Decode(_) | Self::Storage(_) | Self::Grid(_)
        )
    }
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<tiff::TiffError> for StoreError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Decode(format!("TIFF: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("JSON: {}", err))
    }
}

/// Result type for raster store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
