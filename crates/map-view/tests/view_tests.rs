//! Integration tests for the map view: loading, transitions, cancellation
//! and statistics reporting.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use map_view::{FrameScheduler, ManualClock, MapView, QueuedScheduler, ViewConfig, ViewError};
use raster_store::YearCache;
use renderer::{paint, PixelBuffer, StatsRecord, ValueRange};
use sahel_common::{DataType, Year, YearRange};
use test_utils::{assert_approx_eq, create_land_cover_grid, uniform_grid, MemoryRasterSource};

const YEARS: YearRange = YearRange {
    start: 2010,
    end: 2020,
};

struct Harness {
    view: MapView,
    scheduler: Arc<QueuedScheduler>,
    clock: Arc<ManualClock>,
    cache: Arc<YearCache>,
    stats: Arc<Mutex<Vec<StatsRecord>>>,
}

fn harness(source: MemoryRasterSource, initial_year: Year) -> Harness {
    let scheduler = Arc::new(QueuedScheduler::new());
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(YearCache::new(Arc::new(source)));
    let config = ViewConfig {
        transition_ms: 1000,
        initial_year,
        seed: Some(11),
        ..ViewConfig::default()
    };

    let mut view = MapView::new(cache.clone(), config, scheduler.clone(), clock.clone()).unwrap();
    let stats = Arc::new(Mutex::new(Vec::new()));
    let sink = stats.clone();
    view.on_stats_change(move |record| sink.lock().unwrap().push(record.clone()));

    Harness {
        view,
        scheduler,
        clock,
        cache,
        stats,
    }
}

/// Source publishing every year of every base type, 4x4 each.
fn full_source() -> MemoryRasterSource {
    MemoryRasterSource::new(YEARS)
        .with_all_years(DataType::LandCover, |y| {
            create_land_cover_grid(4, 4, &[(y - 2005) as u8, 0])
        })
        .with_all_years(DataType::Vegetation, |y| uniform_grid(4, 4, (y - 2000) as f32))
        .with_all_years(DataType::Precipitation, |y| {
            uniform_grid(4, 4, (y - 2000) as f32 * 40.0).with_declared_range(Some(0.0), Some(1000.0))
        })
}

/// Drive scheduled frames until none are left. Returns the frame count.
fn run_frames(h: &mut Harness, step: Duration) -> usize {
    let mut frames = 0;
    while let Some(id) = h.scheduler.next_frame() {
        h.clock.advance(step);
        h.view.on_frame(id).unwrap();
        frames += 1;
        assert!(frames < 1000, "animation did not terminate");
    }
    frames
}

fn painted(grid: &sahel_common::RasterGrid, data_type: DataType) -> PixelBuffer {
    let mut buffer = PixelBuffer::for_grid(grid, data_type);
    let range = ValueRange::for_grid(data_type, grid);
    paint(&mut buffer, grid, data_type, range, data_type.smoothing()).unwrap();
    buffer
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_select_data_type_paints_immediately() {
    let mut h = harness(full_source(), 2015);
    assert!(h.view.is_loading());
    assert!(h.view.canvas().is_none());

    let report = h.view.select_data_type(DataType::LandCover).await.unwrap();
    assert_eq!(report.loaded.len(), 11);
    assert!(!h.view.is_loading());
    assert!(!h.view.is_animating());
    assert_eq!(h.scheduler.pending_count(), 0);

    let (buffer, size) = h.view.canvas().unwrap();
    assert_eq!((size.native.width, size.native.height), (4, 4));
    assert_eq!(size.display_scale(), (1.0, 1.0));

    let expected = painted(&h.cache.get(DataType::LandCover, 2015).unwrap(), DataType::LandCover);
    assert_eq!(buffer.data(), expected.data());

    let stats = h.stats.lock().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].data_type, DataType::LandCover);
    assert_eq!(stats[0].counted_cells(), 16);
    assert_eq!(stats[0].entry("10").unwrap().count, 8);
}

#[tokio::test]
async fn test_gradient_type_reuses_cached_years() {
    let source = Arc::new(full_source());
    let cache = Arc::new(YearCache::new(source.clone()));
    let scheduler = Arc::new(QueuedScheduler::new());
    let clock = Arc::new(ManualClock::new());
    let mut view = MapView::new(cache, ViewConfig::default(), scheduler, clock).unwrap();

    view.select_data_type(DataType::Vegetation).await.unwrap();
    let report = view.select_data_type(DataType::VegetationGradient).await.unwrap();
    assert!(report.loaded.is_empty());
    assert_eq!(source.load_count(DataType::Vegetation, 2013), 1);

    // Gradient variants render at twice the native resolution
    let (buffer, _) = view.canvas().unwrap();
    assert_eq!((buffer.width(), buffer.height()), (8, 8));
}

#[tokio::test]
async fn test_missing_grid_keeps_previous_frame() {
    let source = full_source();
    for year in YEARS.years() {
        source.fail(DataType::Population, year);
    }
    let mut h = harness(source, 2015);

    h.view.select_data_type(DataType::LandCover).await.unwrap();
    let before = h.view.canvas().unwrap().0.clone();

    let report = h.view.select_data_type(DataType::Population).await.unwrap();
    assert_eq!(report.failed.len(), 11);
    assert!(h.view.is_loading());

    // Nothing new painted and no stats beyond the land cover render
    assert_eq!(h.view.canvas().unwrap().0, &before);
    assert_eq!(h.stats.lock().unwrap().len(), 1);
    assert!(h.view.select_year(2012.0).is_ok());
}

// ============================================================================
// Transitions
// ============================================================================

#[tokio::test]
async fn test_year_change_animates_to_exact_target() {
    let mut h = harness(full_source(), 2020);
    h.view.select_data_type(DataType::LandCover).await.unwrap();

    h.view.select_year(2012.0).unwrap();
    assert!(h.view.is_animating());
    assert_eq!(h.scheduler.pending_count(), 1);
    assert_eq!(h.stats.lock().unwrap().len(), 1);

    let frames = run_frames(&mut h, Duration::from_millis(100));
    assert_eq!(frames, 10);
    assert!(!h.view.is_animating());
    assert!(h.view.pending_frame().is_none());

    let target = h.cache.get(DataType::LandCover, 2012).unwrap();
    let expected = painted(&target, DataType::LandCover);
    assert_eq!(h.view.canvas().unwrap().0.data(), expected.data());

    let stats = h.stats.lock().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[1].year, 2012.0);
}

#[tokio::test]
async fn test_interpolated_year_between_sparse_grids() {
    let source = MemoryRasterSource::new(YEARS);
    source.add(DataType::Vegetation, 2010, uniform_grid(3, 3, 10.0));
    source.add(DataType::Vegetation, 2020, uniform_grid(3, 3, 20.0));
    let mut h = harness(source, 2010);

    h.view.select_data_type(DataType::Vegetation).await.unwrap();
    assert_eq!(h.view.last_stats().unwrap().mean, Some(10.0));

    h.view.select_year(2015.0).unwrap();
    run_frames(&mut h, Duration::from_millis(250));

    assert_approx_eq!(h.view.effective_year(), 2015.0, 1e-9);
    let stats = h.view.last_stats().unwrap();
    assert_eq!(stats.mean, Some(15.0));
    assert_eq!(stats.year, 2015.0);
}

#[tokio::test]
async fn test_new_year_mid_transition_replaces_it() {
    let mut h = harness(full_source(), 2020);
    h.view.select_data_type(DataType::Vegetation).await.unwrap();

    h.view.select_year(2012.0).unwrap();
    let first = h.scheduler.next_frame().unwrap();
    h.clock.advance(Duration::from_millis(300));
    h.view.on_frame(first).unwrap();
    assert!(h.view.is_animating());

    let before = h.scheduler.cancelled_count();
    h.view.select_year(2018.0).unwrap();
    assert_eq!(h.scheduler.cancelled_count(), before + 1);
    assert_eq!(h.scheduler.pending_count(), 1);

    run_frames(&mut h, Duration::from_millis(200));
    let stats = h.stats.lock().unwrap();
    // Initial render plus the last requested year only
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[1].mean, Some(18.0));
}

#[tokio::test]
async fn test_switch_type_mid_transition_cancels_animation() {
    let mut h = harness(full_source(), 2020);
    h.view.select_data_type(DataType::LandCover).await.unwrap();

    h.view.select_year(2011.0).unwrap();
    let stale = h.view.pending_frame().unwrap();
    assert!(h.view.is_animating());

    h.view.select_data_type(DataType::Precipitation).await.unwrap();
    assert!(!h.view.is_animating());
    assert!(h.view.pending_frame().is_none());
    assert_eq!(h.scheduler.pending_count(), 0);

    // The new type is painted at once for the requested year
    let target = h.cache.get(DataType::Precipitation, 2011).unwrap();
    let expected = painted(&target, DataType::Precipitation);
    assert_eq!(h.view.canvas().unwrap().0.data(), expected.data());

    // A late callback for the cancelled frame changes nothing
    h.view.on_frame(stale).unwrap();
    assert_eq!(h.view.canvas().unwrap().0.data(), expected.data());

    let stats = h.stats.lock().unwrap();
    assert_eq!(stats.last().unwrap().data_type, DataType::Precipitation);
}

#[tokio::test]
async fn test_same_year_does_not_animate() {
    let mut h = harness(full_source(), 2014);
    h.view.select_data_type(DataType::LandCover).await.unwrap();
    h.view.select_year(2014.0).unwrap();
    assert!(!h.view.is_animating());
    assert_eq!(h.scheduler.pending_count(), 0);
}

#[tokio::test]
async fn test_mismatched_year_keeps_running_transition() {
    let source = MemoryRasterSource::new(YEARS);
    source.add(DataType::Vegetation, 2010, uniform_grid(4, 4, 10.0));
    source.add(DataType::Vegetation, 2011, uniform_grid(4, 4, 11.0));
    source.add(DataType::Vegetation, 2012, uniform_grid(2, 2, 12.0));
    let mut h = harness(source, 2010);
    h.view.select_data_type(DataType::Vegetation).await.unwrap();

    h.view.select_year(2011.0).unwrap();
    let pending = h.view.pending_frame();

    let err = h.view.select_year(2012.0).unwrap_err();
    assert!(matches!(err, ViewError::ShapeMismatch { left: 16, right: 4 }));

    // The rejected request changes nothing
    assert_eq!(h.view.year(), 2011.0);
    assert_eq!(h.view.effective_year(), 2011.0);
    assert!(h.view.is_animating());
    assert_eq!(h.view.pending_frame(), pending);

    run_frames(&mut h, Duration::from_millis(250));
    let stats = h.stats.lock().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[1].year, 2011.0);
    assert_eq!(stats[1].mean, Some(11.0));
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn test_dispose_cancels_and_clears() {
    let mut h = harness(full_source(), 2020);
    h.view.select_data_type(DataType::Vegetation).await.unwrap();
    h.view.select_year(2015.0).unwrap();
    assert_eq!(h.scheduler.pending_count(), 1);

    h.view.dispose();
    assert_eq!(h.scheduler.pending_count(), 0);
    assert!(h.cache.is_empty());
    assert!(h.view.canvas().is_none());
    assert!(matches!(h.view.select_year(2016.0), Err(ViewError::Disposed)));
    assert!(matches!(
        h.view.select_data_type(DataType::LandCover).await,
        Err(ViewError::Disposed)
    ));
}

#[tokio::test]
async fn test_drop_cancels_pending_frame() {
    let h = {
        let mut h = harness(full_source(), 2020);
        h.view.select_data_type(DataType::LandCover).await.unwrap();
        h.view.select_year(2010.0).unwrap();
        h
    };
    let scheduler = h.scheduler.clone();
    assert_eq!(scheduler.pending_count(), 1);

    drop(h);
    assert_eq!(scheduler.pending_count(), 0);
    assert_eq!(scheduler.requested_count(), 1);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ViewConfig {
        transition_ms: 10 * 60 * 1000,
        ..ViewConfig::default()
    };
    let result = MapView::new(
        Arc::new(YearCache::new(Arc::new(MemoryRasterSource::new(YEARS)))),
        config,
        Arc::new(QueuedScheduler::new()),
        Arc::new(ManualClock::new()),
    );
    assert!(matches!(result, Err(ViewError::Config(_))));
}

#[test]
fn test_scheduler_is_object_safe() {
    let scheduler: Arc<dyn FrameScheduler> = Arc::new(QueuedScheduler::new());
    let id = scheduler.request_frame();
    scheduler.cancel_frame(id);
}
