//! In-memory raster source for cache and view tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use raster_store::{RasterSource, StoreError, StoreResult};
use sahel_common::{DataType, RasterGrid, Year, YearRange};

/// Serves preset grids keyed by base type and year.
///
/// Every call to [`RasterSource::load`] is counted, so tests can assert a
/// year was fetched at most once. Years marked with [`fail`](Self::fail)
/// or without a grid return a load failure.
pub struct MemoryRasterSource {
    years: YearRange,
    grids: Mutex<HashMap<(DataType, Year), RasterGrid>>,
    failing: Mutex<HashSet<(DataType, Year)>>,
    loads: Mutex<HashMap<(DataType, Year), usize>>,
    delay: Option<Duration>,
}

impl MemoryRasterSource {
    pub fn new(years: YearRange) -> Self {
        Self {
            years,
            grids: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            loads: Mutex::new(HashMap::new()),
            delay: None,
        }
    }

    /// Sleep this long inside every load.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Publish a grid for every year in the range, built by `grid_for`.
    pub fn with_all_years(self, data_type: DataType, grid_for: impl Fn(Year) -> RasterGrid) -> Self {
        for year in self.years.years() {
            self.add(data_type, year, grid_for(year));
        }
        self
    }

    pub fn add(&self, data_type: DataType, year: Year, grid: RasterGrid) {
        self.grids
            .lock()
            .unwrap()
            .insert((data_type.base(), year), grid);
    }

    /// Make loads of `(data_type, year)` fail until [`heal`](Self::heal).
    pub fn fail(&self, data_type: DataType, year: Year) {
        self.failing.lock().unwrap().insert((data_type.base(), year));
    }

    pub fn heal(&self, data_type: DataType, year: Year) {
        self.failing.lock().unwrap().remove(&(data_type.base(), year));
    }

    /// Number of load calls for one key, failed ones included.
    pub fn load_count(&self, data_type: DataType, year: Year) -> usize {
        self.loads
            .lock()
            .unwrap()
            .get(&(data_type.base(), year))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_loads(&self) -> usize {
        self.loads.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl RasterSource for MemoryRasterSource {
    async fn load(&self, year: Year, data_type: DataType) -> StoreResult<RasterGrid> {
        let key = (data_type.base(), year);
        *self.loads.lock().unwrap().entry(key).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&key) {
            return Err(StoreError::load_failed(data_type, year, "injected failure"));
        }

        self.grids
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::load_failed(data_type, year, "no such asset"))
    }

    fn years(&self, _data_type: DataType) -> YearRange {
        self.years
    }
}
