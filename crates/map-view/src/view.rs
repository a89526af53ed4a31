//! The map view controller.

use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};

use raster_store::{interpolate, LoadReport, StoreError, YearCache};
use renderer::{aggregate, paint, CanvasSize, DisplaySize, NativeSize, PixelBuffer, StatsRecord, ValueRange};
use sahel_common::{DataType, RasterGrid};

use crate::animator::{FrameOutcome, TransitionAnimator};
use crate::clock::Clock;
use crate::config::ViewConfig;
use crate::error::{ViewError, ViewResult};
use crate::scheduler::{FrameId, FrameScheduler};

/// Callback receiving the statistics of every completed render.
pub type StatsListener = Box<dyn Fn(&StatsRecord) + Send + Sync>;

/// Caller-facing map controller.
///
/// Owns the pixel buffer, the transition animator and at most one pending
/// frame. The year cache is shared and injected.
pub struct MapView {
    cache: Arc<YearCache>,
    config: ViewConfig,
    scheduler: Arc<dyn FrameScheduler>,
    clock: Arc<dyn Clock>,
    animator: TransitionAnimator,
    data_type: DataType,
    /// Requested (possibly fractional) year.
    year: f64,
    /// Year the current target grid actually represents.
    effective_year: f64,
    /// Scale of the current target grid.
    range: Option<ValueRange>,
    buffer: Option<PixelBuffer>,
    /// Grid currently on the canvas, reveal frames included.
    visible: Option<Arc<RasterGrid>>,
    pending_frame: Option<FrameId>,
    listeners: Vec<StatsListener>,
    last_stats: Option<StatsRecord>,
    disposed: bool,
}

impl MapView {
    pub fn new(
        cache: Arc<YearCache>,
        config: ViewConfig,
        scheduler: Arc<dyn FrameScheduler>,
        clock: Arc<dyn Clock>,
    ) -> ViewResult<Self> {
        config.validate().map_err(ViewError::Config)?;

        let animator = TransitionAnimator::new(config.transition(), config.seed);
        let year = config.initial_year as f64;
        Ok(Self {
            cache,
            data_type: config.initial_data_type,
            year,
            effective_year: year,
            config,
            scheduler,
            clock,
            animator,
            range: None,
            buffer: None,
            visible: None,
            pending_frame: None,
            listeners: Vec::new(),
            last_stats: None,
            disposed: false,
        })
    }

    /// Switch data type.
    ///
    /// Cancels any running transition, loads every year of the type that is
    /// not cached yet and paints the current year right away.
    #[instrument(skip(self), fields(data_type = %data_type))]
    pub async fn select_data_type(&mut self, data_type: DataType) -> ViewResult<LoadReport> {
        self.ensure_active()?;

        self.cancel_pending();
        if self.animator.cancel() {
            debug!("Cancelled running transition");
        }
        self.data_type = data_type;
        self.visible = None;

        let report = self.cache.ensure_loaded(data_type).await;
        info!(
            cached = self.cache.available_years(data_type).len(),
            failed = report.failed.len(),
            "Data type selected"
        );

        self.render_now()?;
        Ok(report)
    }

    /// Move to another (possibly fractional) year of the current type.
    ///
    /// With a grid already on the canvas this starts a transition from
    /// whatever is visible, replacing any running one. Otherwise the year is
    /// painted immediately. A transition that cannot start leaves the view
    /// as it was.
    pub fn select_year(&mut self, year: f64) -> ViewResult<()> {
        self.ensure_active()?;

        let Some(visible) = self.visible.clone() else {
            self.year = year;
            return self.render_now();
        };
        let Some((effective_year, target)) = self.resolve_target(year)? else {
            self.year = year;
            return Ok(());
        };

        if Arc::ptr_eq(&visible, &target) {
            self.cancel_pending();
            self.animator.cancel();
            self.year = year;
            self.effective_year = effective_year;
            return Ok(());
        }

        self.animator.start(visible, Arc::clone(&target), self.clock.now())?;
        self.year = year;
        self.effective_year = effective_year;
        self.range = ValueRange::for_grid(self.data_type, &target);
        metrics::counter!("sahel_transitions_started_total", "data_type" => self.data_type.as_str())
            .increment(1);
        debug!(year, effective_year, "Transition started");

        self.schedule_frame();
        Ok(())
    }

    /// Host callback for a frame requested from the scheduler.
    ///
    /// Ids other than the pending one are stale and ignored.
    pub fn on_frame(&mut self, id: FrameId) -> ViewResult<()> {
        if self.disposed || self.pending_frame != Some(id) {
            trace!(?id, "Ignoring stale frame");
            return Ok(());
        }
        self.pending_frame = None;

        match self.animator.frame(self.clock.now())? {
            FrameOutcome::Idle => {}
            FrameOutcome::InProgress { grid, progress } => {
                trace!(progress, "Transition frame");
                self.paint_grid(&grid)?;
                self.visible = Some(Arc::new(grid));
                self.schedule_frame();
            }
            FrameOutcome::Complete(target) => {
                self.paint_grid(&target)?;
                self.visible = Some(Arc::clone(&target));
                self.report_stats(&target);
                debug!(year = self.effective_year, "Transition complete");
            }
        }
        Ok(())
    }

    /// Register a listener for completed-render statistics.
    pub fn on_stats_change(&mut self, listener: impl Fn(&StatsRecord) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// True until the active type has been attempted and has a cached year.
    pub fn is_loading(&self) -> bool {
        !self.cache.has_attempted(self.data_type)
            || self.cache.available_years(self.data_type).is_empty()
    }

    /// Current pixel buffer with its native and display sizes.
    pub fn canvas(&self) -> Option<(&PixelBuffer, CanvasSize)> {
        let buffer = self.buffer.as_ref()?;
        let native = buffer.size();
        let display = self.config.display.unwrap_or(DisplaySize {
            width: native.width as f32,
            height: native.height as f32,
        });
        Some((buffer, CanvasSize { native, display }))
    }

    /// Cancel pending work and drop every cached raster.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_pending();
        self.animator.cancel();
        self.cache.dispose();
        self.buffer = None;
        self.visible = None;
        self.listeners.clear();
        self.disposed = true;
        info!("Map view disposed");
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn year(&self) -> f64 {
        self.year
    }

    /// Year represented by the current target grid, after clamping to the
    /// cached years.
    pub fn effective_year(&self) -> f64 {
        self.effective_year
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    pub fn last_stats(&self) -> Option<&StatsRecord> {
        self.last_stats.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_active(&self) -> ViewResult<()> {
        if self.disposed {
            return Err(ViewError::Disposed);
        }
        Ok(())
    }

    /// Paint the requested year without a transition.
    fn render_now(&mut self) -> ViewResult<()> {
        let Some((effective_year, target)) = self.resolve_target(self.year)? else {
            return Ok(());
        };

        self.effective_year = effective_year;
        self.range = ValueRange::for_grid(self.data_type, &target);
        self.paint_grid(&target)?;
        self.visible = Some(Arc::clone(&target));
        self.report_stats(&target);
        Ok(())
    }

    /// Effective year and grid for `year`, or `None` when the type has
    /// nothing cached. The previous frame stays on the canvas in that case.
    fn resolve_target(&self, year: f64) -> ViewResult<Option<(f64, Arc<RasterGrid>)>> {
        match interpolate(&self.cache, self.data_type, year)? {
            Some((interp, grid)) => {
                let span = (interp.next_year - interp.prev_year) as f64;
                Ok(Some((interp.prev_year as f64 + interp.progress * span, grid)))
            }
            None => {
                let missing = StoreError::MissingGrid {
                    data_type: self.data_type,
                    year,
                };
                warn!(error = %missing, "Keeping previous frame");
                Ok(None)
            }
        }
    }

    /// Paint into the buffer, replacing it first if the native size changed.
    fn paint_grid(&mut self, grid: &RasterGrid) -> ViewResult<()> {
        let scale = self.data_type.render_scale();
        let size = NativeSize {
            width: grid.width() * scale,
            height: grid.height() * scale,
        };

        if !self.buffer.as_ref().is_some_and(|b| b.matches(size)) {
            debug!(width = size.width, height = size.height, "Allocating pixel buffer");
            self.buffer = None;
        }
        let buffer = self
            .buffer
            .get_or_insert_with(|| PixelBuffer::new(size.width, size.height));

        paint(buffer, grid, self.data_type, self.range, self.data_type.smoothing())?;
        metrics::counter!("sahel_frames_painted_total").increment(1);
        Ok(())
    }

    fn report_stats(&mut self, grid: &RasterGrid) {
        let record = aggregate(grid, self.data_type, self.range, self.effective_year);
        for listener in &self.listeners {
            listener(&record);
        }
        self.last_stats = Some(record);
    }

    fn schedule_frame(&mut self) {
        self.cancel_pending();
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}

impl Drop for MapView {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
