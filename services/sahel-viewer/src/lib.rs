//! Headless driver for the Sahel map view.
//!
//! Wires a [`YearCache`] over the configured asset backend into a
//! [`MapView`] and drives its frames without a browser: the scheduler is
//! a queue drained by [`Session::run_frames`], and every painted frame can
//! be written out as PNG.
//!
//! ```text
//! CLI args ──► StoreConfig / ViewConfig
//!                   │
//!                   ▼
//!   ObjectStoreRasterSource ─► YearCache ─► MapView
//!                                              │
//!        QueuedScheduler ◄── request_frame ────┤
//!              │                               │
//!              └── next_frame ─► on_frame ─────┘──► PNG / stats JSON
//! ```

pub mod commands;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use map_view::{Clock, ManualClock, MapView, QueuedScheduler, SystemClock, ViewConfig};
use raster_store::{ObjectStoreRasterSource, StoreConfig, YearCache};

pub use commands::{animate, render, stats, AnimationSummary};

/// How frame time advances while draining the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Advance a manual clock by one frame interval per frame. Output does
    /// not depend on wall time.
    Stepped { fps: u32 },
    /// Wait for each frame on a wall-clock interval.
    Realtime { fps: u32 },
}

impl Pacing {
    pub fn frame_interval(&self) -> Duration {
        let fps = match self {
            Self::Stepped { fps } | Self::Realtime { fps } => (*fps).max(1),
        };
        Duration::from_secs_f64(1.0 / fps as f64)
    }
}

/// A map view with its cache, scheduler and clock.
pub struct Session {
    pub view: MapView,
    pub cache: Arc<YearCache>,
    scheduler: Arc<QueuedScheduler>,
    manual_clock: Arc<ManualClock>,
    pacing: Pacing,
}

impl Session {
    pub fn open(store: StoreConfig, view: ViewConfig, pacing: Pacing) -> Result<Self> {
        info!(location = ?store.location, format = %store.format, "Opening raster source");
        let source =
            ObjectStoreRasterSource::from_config(store).context("Failed to open raster source")?;

        let cache = Arc::new(YearCache::new(Arc::new(source)));
        let scheduler = Arc::new(QueuedScheduler::new());
        let manual_clock = Arc::new(ManualClock::new());
        let clock: Arc<dyn Clock> = match pacing {
            Pacing::Stepped { .. } => manual_clock.clone(),
            Pacing::Realtime { .. } => Arc::new(SystemClock::new()),
        };

        let view = MapView::new(cache.clone(), view, scheduler.clone(), clock)
            .context("Invalid view configuration")?;

        Ok(Self {
            view,
            cache,
            scheduler,
            manual_clock,
            pacing,
        })
    }

    /// Drain scheduled frames, calling `on_painted` after each one.
    ///
    /// Returns the number of frames run.
    pub async fn run_frames(
        &mut self,
        mut on_painted: impl FnMut(&MapView) -> Result<()>,
    ) -> Result<usize> {
        let step = self.pacing.frame_interval();
        let mut ticker = match self.pacing {
            Pacing::Realtime { .. } => Some(tokio::time::interval(step)),
            Pacing::Stepped { .. } => None,
        };

        let mut frames = 0;
        while let Some(id) = self.scheduler.next_frame() {
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                None => self.manual_clock.advance(step),
            }

            self.view.on_frame(id)?;
            on_painted(&self.view)?;
            frames += 1;
        }

        debug!(frames, "Frame queue drained");
        Ok(frames)
    }

    pub fn log_cache_stats(&self) {
        let stats = self.cache.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            loads = stats.loads,
            load_failures = stats.load_failures,
            "Cache stats"
        );
    }
}

/// Encode the current canvas and write it to `path`.
///
/// Returns false when nothing has been painted yet.
pub fn write_canvas(view: &MapView, path: &Path) -> Result<bool> {
    let Some((buffer, size)) = view.canvas() else {
        return Ok(false);
    };

    let png = buffer.to_png().context("Failed to encode PNG")?;
    std::fs::write(path, &png).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = size.native.width,
        height = size.native.height,
        bytes = png.len(),
        "Wrote frame"
    );
    Ok(true)
}
