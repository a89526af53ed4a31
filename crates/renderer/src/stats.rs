//! Statistics over a rendered grid.
//!
//! Every cell lands in exactly one entry, so counts always sum to
//! `width * height`. The grid is only read.

use serde::Serialize;

use sahel_common::{DataType, RasterGrid};

use crate::classify::{
    is_valid_value, land_cover_class, ValueRange, LAND_COVER_CLASSES, PRECIPITATION_PALETTE,
};

/// Buckets used for vegetation and population.
pub const CONTINUOUS_BUCKETS: usize = 5;

/// Key of the entry counting invalid cells.
pub const NO_DATA_KEY: &str = "noData";

/// Key of the entry counting land cover ids outside the class table.
pub const UNKNOWN_CLASS_KEY: &str = "unknown";

/// One class or bucket count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsEntry {
    pub key: String,
    pub label: String,
    pub count: usize,
    /// Share of all cells, in `[0, 1]`.
    pub fraction: f64,
}

/// Aggregate statistics of one completed render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub data_type: DataType,
    /// Effective (possibly fractional) year of the rendered grid.
    pub year: f64,
    pub total_cells: usize,
    pub entries: Vec<StatsEntry>,
    /// Mean over valid cells, for continuous types.
    pub mean: Option<f64>,
}

impl StatsRecord {
    pub fn entry(&self, key: &str) -> Option<&StatsEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Sum of all entry counts.
    pub fn counted_cells(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Reduce a grid to per-class or per-bucket counts.
///
/// `range` is the scale domain the grid was painted with; it is ignored
/// for land cover.
pub fn aggregate(
    grid: &RasterGrid,
    data_type: DataType,
    range: Option<ValueRange>,
    year: f64,
) -> StatsRecord {
    let base = data_type.base();
    let total_cells = grid.len();

    let (counts, mean) = match base {
        DataType::LandCover => (land_cover_counts(grid), None),
        DataType::Precipitation => {
            let range = resolve_range(base, range);
            bucket_counts(grid, base, range, PRECIPITATION_PALETTE.len(), "mm")
        }
        DataType::Population => {
            let range = resolve_range(base, range);
            bucket_counts(grid, base, range, CONTINUOUS_BUCKETS, "per km²")
        }
        _ => {
            let range = resolve_range(base, range);
            bucket_counts(grid, base, range, CONTINUOUS_BUCKETS, "")
        }
    };

    let entries = counts
        .into_iter()
        .map(|(key, label, count)| StatsEntry {
            key,
            label,
            count,
            fraction: if total_cells > 0 {
                count as f64 / total_cells as f64
            } else {
                0.0
            },
        })
        .collect();

    StatsRecord {
        data_type,
        year,
        total_cells,
        entries,
        mean,
    }
}

type Counts = Vec<(String, String, usize)>;

fn resolve_range(base: DataType, range: Option<ValueRange>) -> ValueRange {
    range
        .or_else(|| ValueRange::default_for(base))
        .unwrap_or(ValueRange { min: 0.0, max: 1.0 })
}

/// Count per rounded class id. Only classes present in the grid are listed.
fn land_cover_counts(grid: &RasterGrid) -> Counts {
    let mut per_class = [0usize; LAND_COVER_CLASSES.len()];
    let mut unknown = 0;
    let mut no_data = 0;

    for &value in grid.values() {
        if value.is_nan() {
            no_data += 1;
            continue;
        }
        match land_cover_class(value) {
            Some(class) => per_class[class.id as usize] += 1,
            None => unknown += 1,
        }
    }

    let mut counts: Counts = LAND_COVER_CLASSES
        .iter()
        .zip(per_class)
        .filter(|(_, count)| *count > 0)
        .map(|(class, count)| (class.id.to_string(), class.label.to_string(), count))
        .collect();

    if unknown > 0 {
        counts.push((UNKNOWN_CLASS_KEY.to_string(), "Unclassified".to_string(), unknown));
    }
    if no_data > 0 {
        counts.push((NO_DATA_KEY.to_string(), "No data".to_string(), no_data));
    }
    counts
}

/// Equal-width bucket counts plus a no-data entry, and the valid mean.
fn bucket_counts(
    grid: &RasterGrid,
    base: DataType,
    range: ValueRange,
    buckets: usize,
    unit: &str,
) -> (Counts, Option<f64>) {
    let mut per_bucket = vec![0usize; buckets];
    let mut no_data = 0;
    let mut sum = 0.0f64;

    for &value in grid.values() {
        if !is_valid_value(base, value) {
            no_data += 1;
            continue;
        }
        per_bucket[range.bucket(value, buckets)] += 1;
        sum += value as f64;
    }

    let valid = grid.len() - no_data;
    let mean = (valid > 0).then(|| sum / valid as f64);

    let mut counts: Counts = per_bucket
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let (lo, hi) = range.bucket_bounds(i, buckets);
            let label = if unit.is_empty() {
                format!("{:.0}-{:.0}", lo, hi)
            } else {
                format!("{:.0}-{:.0} {}", lo, hi, unit)
            };
            (format!("bucket{}", i), label, count)
        })
        .collect();
    counts.push((NO_DATA_KEY.to_string(), "No data".to_string(), no_data));

    (counts, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_land_cover_counts_include_class_zero() {
        let grid = RasterGrid::new(3, 2, vec![0.0, 0.0, 7.0, 13.0, 99.0, f32::NAN]).unwrap();
        let record = aggregate(&grid, DataType::LandCover, None, 2015.0);

        assert_eq!(record.total_cells, 6);
        assert_eq!(record.counted_cells(), 6);
        assert_eq!(record.entry("0").unwrap().count, 2);
        assert_eq!(record.entry("7").unwrap().label, "Open Shrublands");
        assert_eq!(record.entry(UNKNOWN_CLASS_KEY).unwrap().count, 1);
        assert_eq!(record.entry(NO_DATA_KEY).unwrap().count, 1);
        assert!(record.mean.is_none());
    }

    #[test]
    fn test_precipitation_buckets_and_mean() {
        let grid = RasterGrid::new(2, 2, vec![0.0, 450.0, 900.0, f32::NAN]).unwrap();
        let range = ValueRange::new(0.0, 900.0).unwrap();
        let record = aggregate(&grid, DataType::Precipitation, Some(range), 2012.0);

        assert_eq!(record.entries.len(), PRECIPITATION_PALETTE.len() + 1);
        assert_eq!(record.entry("bucket0").unwrap().count, 1);
        assert_eq!(record.entry("bucket4").unwrap().count, 1);
        assert_eq!(record.entry("bucket8").unwrap().count, 1);
        assert_eq!(record.entry(NO_DATA_KEY).unwrap().count, 1);
        assert_eq!(record.mean, Some(450.0));
        assert_eq!(record.counted_cells(), 4);
    }

    #[test]
    fn test_vegetation_sentinels_are_no_data() {
        let grid = RasterGrid::new(4, 1, vec![65533.0, -1.0, 10.0, 20.0]).unwrap();
        let range = ValueRange::new(10.0, 20.0).unwrap();
        let record = aggregate(&grid, DataType::VegetationGradient, Some(range), 2020.0);

        assert_eq!(record.data_type, DataType::VegetationGradient);
        assert_eq!(record.entry(NO_DATA_KEY).unwrap().count, 2);
        assert_eq!(record.entry("bucket0").unwrap().count, 1);
        assert_eq!(record.entry("bucket4").unwrap().count, 1);
        assert_eq!(record.mean, Some(15.0));
    }

    #[test]
    fn test_all_invalid_has_no_mean() {
        let grid = RasterGrid::new(2, 1, vec![-9999.0, f32::NAN]).unwrap();
        let record = aggregate(&grid, DataType::Population, None, 2010.0);
        assert!(record.mean.is_none());
        assert_eq!(record.entry(NO_DATA_KEY).unwrap().fraction, 1.0);
    }
}
