//! Rendering for Sahel environmental rasters.
//!
//! # Pipeline
//!
//! ```text
//! RasterGrid + DataType
//!      │
//!      ├─► ValueRange::for_grid()       declared bounds or on-demand min/max
//!      │
//!      ├─► ClassificationScale           categorical / quantized / normalized
//!      │         │
//!      │         ▼
//!      ├─► canvas::paint()               hard fill or bilinear smoothing
//!      │         │
//!      │         ▼
//!      │    PixelBuffer ─► png::create_png_auto()
//!      │
//!      └─► stats::aggregate()            per-class / per-bucket counts
//! ```

pub mod canvas;
pub mod classify;
pub mod error;
pub mod png;
pub mod stats;

pub use canvas::{paint, CanvasSize, DisplaySize, NativeSize, PixelBuffer};
pub use classify::{color_for, ClassificationScale, Rgba, ValueRange, NO_DATA};
pub use error::{RenderError, RenderResult};
pub use stats::{aggregate, StatsEntry, StatsRecord};
