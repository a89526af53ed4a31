//! Test data generators for creating synthetic Sahel-like rasters.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use sahel_common::RasterGrid;

/// Creates a grid filled with a constant value.
pub fn uniform_grid(width: usize, height: usize, value: f32) -> RasterGrid {
    RasterGrid::new(width, height, vec![value; width * height]).expect("valid dimensions")
}

/// Creates a grid from explicit values in row-major order.
pub fn grid_from(width: usize, height: usize, values: &[f32]) -> RasterGrid {
    RasterGrid::new(width, height, values.to_vec()).expect("values match dimensions")
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid.values()[1], 1000.0); // col=1, row=0
/// assert_eq!(grid.values()[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> RasterGrid {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    RasterGrid::new(width, height, data).expect("valid dimensions")
}

/// Creates a land cover grid cycling through the given class ids.
///
/// Cell `i` holds `classes[i % classes.len()]`.
pub fn create_land_cover_grid(width: usize, height: usize, classes: &[u8]) -> RasterGrid {
    let data = (0..width * height)
        .map(|i| classes[i % classes.len()] as f32)
        .collect();
    RasterGrid::new(width, height, data).expect("valid dimensions")
}

/// Creates an annual precipitation grid in mm.
///
/// Rainfall increases from the dry north (top rows) to the wetter south,
/// roughly 100 mm to 900 mm, with deterministic per-cell noise.
pub fn create_precipitation_grid(width: usize, height: usize, seed: u32) -> RasterGrid {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let south = row as f32 / height.max(1) as f32;
        for col in 0..width {
            let noise = (simple_hash(col as u32, row as u32, seed) % 100) as f32;
            data.push(100.0 + south * 750.0 + noise);
        }
    }
    RasterGrid::new(width, height, data)
        .expect("valid dimensions")
        .with_declared_range(Some(0.0), Some(1000.0))
}

/// Creates a vegetation grid with a left-to-right gradient between
/// `low` and `high`.
pub fn create_vegetation_grid(width: usize, height: usize, low: f32, high: f32) -> RasterGrid {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let t = if width > 1 {
                col as f32 / (width - 1) as f32
            } else {
                0.0
            };
            data.push(low + (high - low) * t);
        }
    }
    RasterGrid::new(width, height, data).expect("valid dimensions")
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid.get(2, 1), Some(2001.0));
    }

    #[test]
    fn test_land_cover_grid_cycles() {
        let grid = create_land_cover_grid(2, 2, &[7, 13]);
        assert_eq!(grid.values(), &[7.0, 13.0, 7.0, 13.0]);
    }

    #[test]
    fn test_precipitation_grid_is_deterministic() {
        let a = create_precipitation_grid(8, 8, 42);
        let b = create_precipitation_grid(8, 8, 42);
        assert_eq!(a, b);
        assert!(a.values().iter().all(|v| (100.0..=950.0).contains(v)));
    }

    #[test]
    fn test_vegetation_gradient_ends() {
        let grid = create_vegetation_grid(5, 1, 0.0, 4.0);
        assert_eq!(grid.values(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }
}
