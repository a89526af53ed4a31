//! Error types for the map view.

use raster_store::StoreError;
use renderer::RenderError;
use sahel_common::SahelError;
use thiserror::Error;

/// Map view errors.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("cannot transition between grids of {left} and {right} cells")]
    ShapeMismatch { left: usize, right: usize },

    #[error("view configuration error: {0}")]
    Config(String),

    #[error("view has been disposed")]
    Disposed,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Grid(#[from] SahelError),
}

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
