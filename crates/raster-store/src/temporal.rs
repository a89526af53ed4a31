//! Temporal interpolation between known years.

use std::sync::Arc;

use sahel_common::{DataType, RasterGrid, Year};

use crate::cache::YearCache;
use crate::error::{StoreError, StoreResult};

/// A requested year resolved against the known years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    /// Greatest known year at or before the request.
    pub prev_year: Year,
    /// Smallest known year at or after the request.
    pub next_year: Year,
    /// Position between the two years, in `[0, 1]`.
    pub progress: f64,
}

impl Interpolation {
    fn exact(year: Year) -> Self {
        Self {
            prev_year: year,
            next_year: year,
            progress: 0.0,
        }
    }

    /// Whether the request landed on a single known year.
    pub fn is_exact(&self) -> bool {
        self.prev_year == self.next_year
    }
}

/// Resolve a (possibly fractional) year against the known years.
///
/// Requests outside the known range clamp to the nearest boundary year.
/// Returns `None` when there are no known years.
pub fn resolve(known_years: &[Year], requested: f64) -> Option<Interpolation> {
    if requested.is_nan() {
        return None;
    }

    let prev = known_years
        .iter()
        .copied()
        .filter(|&y| y as f64 <= requested)
        .max();
    let next = known_years
        .iter()
        .copied()
        .filter(|&y| y as f64 >= requested)
        .min();

    match (prev, next) {
        (Some(prev), Some(next)) if prev == next => Some(Interpolation::exact(prev)),
        (Some(prev), Some(next)) => Some(Interpolation {
            prev_year: prev,
            next_year: next,
            progress: (requested - prev as f64) / (next - prev) as f64,
        }),
        // Below the first known year
        (None, Some(next)) => Some(Interpolation::exact(next)),
        // Past the last known year
        (Some(prev), None) => Some(Interpolation::exact(prev)),
        (None, None) => None,
    }
}

/// Linearly blend two grids cell by cell.
///
/// Every cell is blended the same way regardless of what it means, so land
/// cover class ids produce in-between values that are not real classes. The
/// colorizer rounds them to the nearest id.
pub fn blend(a: &RasterGrid, b: &RasterGrid, progress: f64) -> StoreResult<RasterGrid> {
    if a.len() != b.len() || !a.same_shape(b) {
        return Err(StoreError::shape_mismatch(a.len(), b.len()));
    }

    let t = progress.clamp(0.0, 1.0) as f32;
    let values = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(&va, &vb)| va + (vb - va) * t)
        .collect();

    let lerp = |x: f32, y: f32| x + (y - x) * t;
    let min = match (a.declared_min(), b.declared_min()) {
        (Some(x), Some(y)) => Some(lerp(x, y)),
        (x, y) => x.or(y),
    };
    let max = match (a.declared_max(), b.declared_max()) {
        (Some(x), Some(y)) => Some(lerp(x, y)),
        (x, y) => x.or(y),
    };

    Ok(RasterGrid::new(a.width(), a.height(), values)?.with_declared_range(min, max))
}

/// Produce the effective grid for a requested year from the cached years.
///
/// Missing years are skipped naturally: the request resolves against the
/// years that are actually cached. Returns `None` when nothing is cached
/// for the type.
pub fn interpolate(
    cache: &YearCache,
    data_type: DataType,
    requested: f64,
) -> StoreResult<Option<(Interpolation, Arc<RasterGrid>)>> {
    let years = cache.available_years(data_type);
    let Some(interpolation) = resolve(&years, requested) else {
        return Ok(None);
    };

    let prev = cache.get(data_type, interpolation.prev_year);
    let next = cache.get(data_type, interpolation.next_year);
    let (Some(prev), Some(next)) = (prev, next) else {
        return Ok(None);
    };

    if interpolation.is_exact() || interpolation.progress == 0.0 {
        return Ok(Some((interpolation, prev)));
    }

    let blended = blend(&prev, &next, interpolation.progress)?;
    Ok(Some((interpolation, Arc::new(blended))))
}
