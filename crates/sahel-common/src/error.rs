//! Error types shared by the Sahel raster crates.

use thiserror::Error;

/// Result type alias using SahelError.
pub type SahelResult<T> = Result<T, SahelError>;

/// Errors raised while building or describing core values.
#[derive(Debug, Error)]
pub enum SahelError {
    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid year range {start}..={end}")]
    InvalidYearRange { start: i32, end: i32 },
}

impl SahelError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }
}

