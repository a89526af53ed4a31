//! Session year cache.
//!
//! Holds every raster loaded during a view's lifetime, keyed by base data
//! type and year. Entries are only ever added: a populated key is never
//! overwritten or evicted until [`YearCache::dispose`]. The first time a data
//! type is activated every published year is loaded, so scrubbing through
//! years never waits on the network.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use sahel_common::{DataType, RasterGrid, Year};

use crate::source::RasterSource;

type TypeGrids = BTreeMap<Year, Arc<RasterGrid>>;

/// Outcome of one [`YearCache::ensure_loaded`] pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Years fetched during this pass.
    pub loaded: Vec<Year>,
    /// Years that were already cached.
    pub skipped: usize,
    /// Years whose load failed, with the error message.
    pub failed: Vec<(Year, String)>,
}

impl LoadReport {
    /// Whether every published year is now cached.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub loads: u64,
    pub load_failures: u64,
}

/// Additive per-session store of loaded rasters.
pub struct YearCache {
    source: Arc<dyn RasterSource>,
    grids: RwLock<HashMap<DataType, TypeGrids>>,
    /// One async lock per base type so a type is never preloaded twice at once.
    loading: Mutex<HashMap<DataType, Arc<tokio::sync::Mutex<()>>>>,
    /// Base types that completed at least one preload pass.
    attempted: RwLock<HashSet<DataType>>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
}

impl YearCache {
    pub fn new(source: Arc<dyn RasterSource>) -> Self {
        Self {
            source,
            grids: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
            attempted: RwLock::new(HashSet::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
        }
    }

    /// Load every published year of `data_type` that is not cached yet.
    ///
    /// Years are fetched one after another. A failed year is logged,
    /// reported and left absent so a later call retries it; the remaining
    /// years are still attempted.
    #[instrument(skip(self), fields(data_type = %data_type))]
    pub async fn ensure_loaded(&self, data_type: DataType) -> LoadReport {
        let base = data_type.base();
        let type_lock = self.type_lock(base);
        let _guard = type_lock.lock().await;

        let mut report = LoadReport::default();
        for year in self.source.years(base).years() {
            if self.contains(base, year) {
                report.skipped += 1;
                continue;
            }

            match self.source.load(year, base).await {
                Ok(grid) => {
                    self.loads.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("sahel_raster_loads_total", "data_type" => base.as_str())
                        .increment(1);
                    debug!(year, width = grid.width(), height = grid.height(), "Cached raster");
                    self.insert(base, year, grid);
                    report.loaded.push(year);
                }
                Err(e) => {
                    self.load_failures.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!(
                        "sahel_raster_load_failures_total",
                        "data_type" => base.as_str()
                    )
                    .increment(1);
                    warn!(year, error = %e, "Raster load failed, skipping year");
                    report.failed.push((year, e.to_string()));
                }
            }
        }

        self.attempted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(base);

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped,
            failed = report.failed.len(),
            "Preload finished"
        );
        report
    }

    /// Get a cached raster.
    pub fn get(&self, data_type: DataType, year: Year) -> Option<Arc<RasterGrid>> {
        let grids = self.grids.read().unwrap_or_else(PoisonError::into_inner);
        match grids.get(&data_type.base()).and_then(|years| years.get(&year)) {
            Some(grid) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(grid))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Check for a cached raster without touching the hit counters.
    pub fn contains(&self, data_type: DataType, year: Year) -> bool {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&data_type.base())
            .is_some_and(|years| years.contains_key(&year))
    }

    /// Cached years of a data type, ascending.
    pub fn available_years(&self, data_type: DataType) -> Vec<Year> {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&data_type.base())
            .map(|years| years.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a preload pass has finished for the type and every published
    /// year is cached.
    pub fn is_fully_loaded(&self, data_type: DataType) -> bool {
        let base = data_type.base();
        self.has_attempted(base)
            && self
                .source
                .years(base)
                .years()
                .all(|year| self.contains(base, year))
    }

    /// Whether at least one preload pass has finished for the type.
    pub fn has_attempted(&self, data_type: DataType) -> bool {
        self.attempted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&data_type.base())
    }

    /// Insert a raster unless the key is already populated.
    ///
    /// Returns `false` when an entry existed; the existing grid is kept.
    pub fn insert(&self, data_type: DataType, year: Year, grid: RasterGrid) -> bool {
        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        let years = grids.entry(data_type.base()).or_default();
        if years.contains_key(&year) {
            return false;
        }
        years.insert(year, Arc::new(grid));
        true
    }

    /// Number of cached rasters across all types.
    pub fn len(&self) -> usize {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached raster at the end of the session.
    pub fn dispose(&self) {
        self.grids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.attempted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Year cache disposed");
    }

    fn type_lock(&self, base: DataType) -> Arc<tokio::sync::Mutex<()>> {
        let mut loading = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(loading.entry(base).or_default())
    }
}
