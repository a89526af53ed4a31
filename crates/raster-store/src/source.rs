//! Raster source loaders.

use async_trait::async_trait;
use object_store::{http::HttpBuilder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore};
use std::sync::Arc;
use tracing::{debug, instrument};

use sahel_common::{DataType, RasterGrid, Year, YearRange};

use crate::config::{AssetLocation, StoreConfig};
use crate::decode::decode_raster;
use crate::error::{StoreError, StoreResult};

/// Fetches one year's raster for one data type.
///
/// Implementations do not cache; caching is the job of
/// [`YearCache`](crate::YearCache).
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Load the raster for `(data_type, year)`.
    ///
    /// Gradient variants load their base type's raster.
    async fn load(&self, year: Year, data_type: DataType) -> StoreResult<RasterGrid>;

    /// Years this source publishes for a data type.
    fn years(&self, data_type: DataType) -> YearRange;
}

/// Raster source backed by an `object_store` backend (local directory,
/// static HTTP assets or memory).
pub struct ObjectStoreRasterSource {
    store: Arc<dyn ObjectStore>,
    config: StoreConfig,
}

impl ObjectStoreRasterSource {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn ObjectStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Build the backend described by `config.location`.
    pub fn from_config(config: StoreConfig) -> StoreResult<Self> {
        config.validate().map_err(StoreError::Config)?;

        let store: Arc<dyn ObjectStore> = match &config.location {
            AssetLocation::Directory(dir) => Arc::new(LocalFileSystem::new_with_prefix(dir)?),
            AssetLocation::Url(url) => Arc::new(HttpBuilder::new().with_url(url).build()?),
            AssetLocation::Memory => Arc::new(InMemory::new()),
        };

        Ok(Self::new(store, config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying store, e.g. to seed an in-memory backend.
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }
}

#[async_trait]
impl RasterSource for ObjectStoreRasterSource {
    #[instrument(skip(self), fields(data_type = %data_type))]
    async fn load(&self, year: Year, data_type: DataType) -> StoreResult<RasterGrid> {
        let range = self.config.years_for(data_type);
        if !range.contains(year) {
            return Err(StoreError::YearOutOfRange {
                data_type,
                year,
                range,
            });
        }

        let location = Path::from(self.config.asset_path(data_type, year));
        let bytes = self
            .store
            .get(&location)
            .await
            .map_err(|e| StoreError::load_failed(data_type, year, e.to_string()))?
            .bytes()
            .await
            .map_err(|e| StoreError::load_failed(data_type, year, e.to_string()))?;

        debug!(path = %location, size = bytes.len(), "Fetched raster");

        let grid = decode_raster(&bytes, self.config.format)?;
        debug!(width = grid.width(), height = grid.height(), "Decoded raster");
        Ok(grid)
    }

    fn years(&self, data_type: DataType) -> YearRange {
        self.config.years_for(data_type)
    }
}
