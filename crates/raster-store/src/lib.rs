//! Raster loading, session caching and temporal interpolation.
//!
//! # Architecture
//!
//! ```text
//! MapView::select_data_type(dt)
//!      │
//!      ▼
//! YearCache::ensure_loaded(dt)
//!      │
//!      ├─► For each published year not cached yet
//!      │         │
//!      │         └─► RasterSource::load(year, dt) ─► decode_raster(bytes)
//!      │                   │
//!      │                   ├─► Ok: insert (never overwrites)
//!      │                   └─► Err: log, report, try the next year
//!      ▼
//! temporal::interpolate(cache, dt, requested_year)
//!      │
//!      ├─► resolve() against the cached years (clamps at the ends)
//!      └─► blend(prev, next, progress)
//!               │
//!               ▼
//!          Return to renderer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use raster_store::{ObjectStoreRasterSource, StoreConfig, YearCache};
//!
//! let source = ObjectStoreRasterSource::from_config(StoreConfig::from_env())?;
//! let cache = YearCache::new(Arc::new(source));
//! cache.ensure_loaded(DataType::LandCover).await;
//!
//! let (_, grid) = raster_store::interpolate(&cache, DataType::LandCover, 2015.5)?
//!     .expect("at least one year cached");
//! ```

pub mod cache;
pub mod config;
pub mod decode;
pub mod error;
pub mod source;
pub mod temporal;

// Re-export commonly used types at crate root
pub use cache::{CacheStats, LoadReport, YearCache};
pub use config::{AssetLocation, RasterFormat, StoreConfig};
pub use decode::{decode_raster, RasterDocument};
pub use error::{StoreError, StoreResult};
pub use source::{ObjectStoreRasterSource, RasterSource};
pub use temporal::{blend, interpolate, resolve, Interpolation};
