//! Common types shared across the Sahel raster engine crates.

pub mod data_type;
pub mod error;
pub mod grid;
pub mod time;

pub use data_type::DataType;
pub use error::{SahelError, SahelResult};
pub use grid::RasterGrid;
pub use time::{Year, YearRange, KNOWN_YEARS};
