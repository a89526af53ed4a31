//! Integration tests for the session year cache and interpolation over it.

use std::sync::Arc;
use std::time::Duration;

use raster_store::{interpolate, YearCache};
use sahel_common::{DataType, YearRange};
use test_utils::{assert_approx_eq, uniform_grid, MemoryRasterSource};

fn decade_source() -> MemoryRasterSource {
    MemoryRasterSource::new(YearRange { start: 2010, end: 2020 })
}

#[tokio::test]
async fn test_ensure_loaded_is_idempotent() {
    let source = Arc::new(
        decade_source().with_all_years(DataType::Vegetation, |y| uniform_grid(3, 3, y as f32)),
    );
    let cache = YearCache::new(source.clone());

    let first = cache.ensure_loaded(DataType::Vegetation).await;
    assert_eq!(first.loaded.len(), 11);
    assert!(first.is_complete());

    let second = cache.ensure_loaded(DataType::Vegetation).await;
    assert!(second.loaded.is_empty());
    assert_eq!(second.skipped, 11);

    for year in 2010..=2020 {
        assert_eq!(source.load_count(DataType::Vegetation, year), 1);
    }
    assert_eq!(cache.len(), 11);
    assert!(cache.is_fully_loaded(DataType::Vegetation));
}

#[tokio::test]
async fn test_concurrent_ensure_loaded_loads_once() {
    let source = Arc::new(
        decade_source()
            .with_delay(Duration::from_millis(2))
            .with_all_years(DataType::Precipitation, |_| uniform_grid(2, 2, 400.0)),
    );
    let cache = YearCache::new(source.clone());

    let (a, b) = tokio::join!(
        cache.ensure_loaded(DataType::Precipitation),
        cache.ensure_loaded(DataType::PrecipitationGradient),
    );

    assert_eq!(a.loaded.len() + b.loaded.len(), 11);
    assert_eq!(source.total_loads(), 11);
}

#[tokio::test]
async fn test_failed_year_is_retried_later() {
    let source = Arc::new(
        decade_source().with_all_years(DataType::Population, |_| uniform_grid(2, 2, 50.0)),
    );
    source.fail(DataType::Population, 2015);
    let cache = YearCache::new(source.clone());

    let report = cache.ensure_loaded(DataType::Population).await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 2015);
    assert!(!cache.is_fully_loaded(DataType::Population));
    assert_eq!(cache.stats().load_failures, 1);

    source.heal(DataType::Population, 2015);
    let report = cache.ensure_loaded(DataType::Population).await;
    assert_eq!(report.loaded, vec![2015]);
    assert!(cache.is_fully_loaded(DataType::Population));
    assert_eq!(source.load_count(DataType::Population, 2015), 2);
    assert_eq!(source.load_count(DataType::Population, 2014), 1);
}

#[tokio::test]
async fn test_interpolate_between_sparse_years() {
    let source = Arc::new(MemoryRasterSource::new(YearRange { start: 2010, end: 2020 }));
    source.add(DataType::Vegetation, 2010, uniform_grid(2, 2, 10.0));
    source.add(DataType::Vegetation, 2020, uniform_grid(2, 2, 20.0));
    let cache = YearCache::new(source);

    let report = cache.ensure_loaded(DataType::Vegetation).await;
    assert_eq!(report.loaded, vec![2010, 2020]);
    assert_eq!(report.failed.len(), 9);

    let (interp, grid) = interpolate(&cache, DataType::Vegetation, 2015.0)
        .unwrap()
        .unwrap();
    assert_eq!((interp.prev_year, interp.next_year), (2010, 2020));
    assert_approx_eq!(interp.progress, 0.5, 1e-9);
    assert!(grid.values().iter().all(|&v| v == 15.0));

    // The gradient variant reads the same entries
    let (_, gradient) = interpolate(&cache, DataType::VegetationGradient, 2015.0)
        .unwrap()
        .unwrap();
    assert_eq!(gradient.values(), grid.values());
}

#[tokio::test]
async fn test_interpolate_exact_year_shares_cached_grid() {
    let source = Arc::new(
        decade_source().with_all_years(DataType::LandCover, |_| uniform_grid(2, 2, 7.0)),
    );
    let cache = YearCache::new(source);
    cache.ensure_loaded(DataType::LandCover).await;

    let (interp, grid) = interpolate(&cache, DataType::LandCover, 2013.0)
        .unwrap()
        .unwrap();
    assert!(interp.is_exact());
    let cached = cache.get(DataType::LandCover, 2013).unwrap();
    assert!(Arc::ptr_eq(&grid, &cached));
}

#[tokio::test]
async fn test_interpolate_nothing_cached() {
    let cache = YearCache::new(Arc::new(decade_source()));
    assert!(interpolate(&cache, DataType::Precipitation, 2015.0)
        .unwrap()
        .is_none());
}
