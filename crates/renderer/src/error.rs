//! Error types for rendering.

use thiserror::Error;

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("pixel buffer {buffer_width}x{buffer_height} cannot hold a {grid_width}x{grid_height} grid")]
    BufferTooSmall {
        buffer_width: usize,
        buffer_height: usize,
        grid_width: usize,
        grid_height: usize,
    },

    #[error("invalid color scale: {0}")]
    InvalidScale(String),

    #[error("PNG encoding failed: {0}")]
    Png(String),
}

impl RenderError {
    pub fn invalid_scale(msg: impl Into<String>) -> Self {
        Self::InvalidScale(msg.into())
    }

    pub fn png(msg: impl Into<String>) -> Self {
        Self::Png(msg.into())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        Self::Png(err.to_string())
    }
}

/// Result type alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
