//! Value classification: raw cell value to display color, per data type.
//!
//! Every path is total over `f32`. `NaN` and the documented sentinel codes
//! paint [`NO_DATA`], the only color in this module with partial alpha, so
//! it can never be confused with a valid reading.

use serde::Serialize;

use sahel_common::{DataType, RasterGrid};

use crate::error::{RenderError, RenderResult};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Painted for `NaN`, fill codes and out-of-domain readings.
pub const NO_DATA: Rgba = Rgba::new(128, 128, 128, 96);

/// Painted for land cover ids outside the class table.
pub const FALLBACK: Rgba = Rgba::rgb(127, 127, 127);

/// Vegetation productivity fill code.
pub const VEGETATION_FILL: f32 = 65533.0;
/// Largest vegetation reading treated as valid.
pub const VEGETATION_CEILING: f32 = 65500.0;
/// Population density fill code.
pub const POPULATION_FILL: f32 = -9999.0;
/// Largest population density (people per km²) treated as valid.
pub const POPULATION_CEILING: f32 = 100_000.0;

/// One entry of the land cover class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandCoverClass {
    pub id: u8,
    pub label: &'static str,
    pub color: Rgba,
}

const fn class(id: u8, label: &'static str, color: Rgba) -> LandCoverClass {
    LandCoverClass { id, label, color }
}

/// IGBP land cover classes. Class 0 is "not land".
pub const LAND_COVER_CLASSES: [LandCoverClass; 18] = [
    class(0, "Not Land", Rgba::rgb(32, 48, 64)),
    class(1, "Evergreen Needleleaf Forests", Rgba::rgb(5, 69, 10)),
    class(2, "Evergreen Broadleaf Forests", Rgba::rgb(8, 106, 16)),
    class(3, "Deciduous Needleleaf Forests", Rgba::rgb(84, 167, 8)),
    class(4, "Deciduous Broadleaf Forests", Rgba::rgb(120, 210, 3)),
    class(5, "Mixed Forests", Rgba::rgb(0, 153, 0)),
    class(6, "Closed Shrublands", Rgba::rgb(198, 176, 68)),
    class(7, "Open Shrublands", Rgba::rgb(220, 209, 89)),
    class(8, "Woody Savannas", Rgba::rgb(218, 222, 72)),
    class(9, "Savannas", Rgba::rgb(251, 255, 19)),
    class(10, "Grasslands", Rgba::rgb(182, 255, 5)),
    class(11, "Permanent Wetlands", Rgba::rgb(39, 255, 135)),
    class(12, "Croplands", Rgba::rgb(194, 79, 68)),
    class(13, "Urban and Built-up Lands", Rgba::rgb(165, 165, 165)),
    class(14, "Cropland/Natural Vegetation Mosaics", Rgba::rgb(255, 109, 76)),
    class(15, "Permanent Snow and Ice", Rgba::rgb(105, 255, 248)),
    class(16, "Barren", Rgba::rgb(249, 255, 164)),
    class(17, "Water Bodies", Rgba::rgb(28, 13, 255)),
];

/// Ordered precipitation palette, driest first.
pub const PRECIPITATION_PALETTE: [Rgba; 9] = [
    Rgba::rgb(247, 251, 255),
    Rgba::rgb(222, 235, 247),
    Rgba::rgb(198, 219, 239),
    Rgba::rgb(158, 202, 225),
    Rgba::rgb(107, 174, 214),
    Rgba::rgb(66, 146, 198),
    Rgba::rgb(33, 113, 181),
    Rgba::rgb(8, 81, 156),
    Rgba::rgb(8, 48, 107),
];

/// Vegetation ramp, low to high productivity.
pub const VEGETATION_RAMP: [Rgba; 5] = [
    Rgba::rgb(255, 255, 229),
    Rgba::rgb(247, 252, 185),
    Rgba::rgb(173, 221, 142),
    Rgba::rgb(65, 171, 93),
    Rgba::rgb(0, 90, 50),
];

/// Population density ramp (magma-like), sparse to dense.
pub const POPULATION_RAMP: [Rgba; 6] = [
    Rgba::rgb(0, 0, 4),
    Rgba::rgb(59, 15, 112),
    Rgba::rgb(140, 41, 129),
    Rgba::rgb(222, 73, 104),
    Rgba::rgb(254, 159, 109),
    Rgba::rgb(252, 253, 191),
];

/// Look up the land cover class nearest to a (possibly blended) value.
pub fn land_cover_class(value: f32) -> Option<&'static LandCoverClass> {
    if !value.is_finite() {
        return None;
    }
    let id = value.round();
    if id < 0.0 {
        return None;
    }
    LAND_COVER_CLASSES.get(id as usize)
}

/// Interpolate between two colors, `t` clamped to `[0, 1]`.
pub fn interpolate_color(color1: Rgba, color2: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f32 * t_inv + b as f32 * t).round() as u8;

    Rgba::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Sample a ramp of evenly spaced stops at `t` in `[0, 1]`.
pub fn ramp_color(ramp: &[Rgba], t: f32) -> Rgba {
    match ramp.len() {
        0 => NO_DATA,
        1 => ramp[0],
        n => {
            let pos = t.clamp(0.0, 1.0) * (n - 1) as f32;
            let i = (pos.floor() as usize).min(n - 2);
            interpolate_color(ramp[i], ramp[i + 1], pos - i as f32)
        }
    }
}

/// Whether a value is a real reading for the data type.
///
/// Invalid values are excluded from range computation and statistics
/// buckets and are painted [`NO_DATA`].
pub fn is_valid_value(data_type: DataType, value: f32) -> bool {
    match data_type.base() {
        DataType::Vegetation => {
            value.is_finite() && value > 0.0 && value != VEGETATION_FILL && value <= VEGETATION_CEILING
        }
        DataType::Population => {
            value.is_finite() && value > 0.0 && value != POPULATION_FILL && value <= POPULATION_CEILING
        }
        _ => !value.is_nan(),
    }
}

/// Scale domain of a continuous data type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Validated range; `min == max` is allowed and paints mid-scale.
    pub fn new(min: f32, max: f32) -> RenderResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RenderError::invalid_scale(format!(
                "bounds must be finite, got {}..{}",
                min, max
            )));
        }
        if min > max {
            return Err(RenderError::invalid_scale(format!("min {} exceeds max {}", min, max)));
        }
        Ok(Self { min, max })
    }

    /// Domain used when a raster carries no usable bounds.
    pub fn default_for(data_type: DataType) -> Option<Self> {
        match data_type.base() {
            DataType::Precipitation => Some(Self { min: 0.0, max: 2000.0 }),
            DataType::Vegetation => Some(Self { min: 0.0, max: 10000.0 }),
            DataType::Population => Some(Self { min: 0.0, max: 1000.0 }),
            _ => None,
        }
    }

    /// Resolve the scale domain for a grid.
    ///
    /// Precipitation and population use the bounds declared with the
    /// raster, vegetation scans its valid cells. Land cover has no domain.
    pub fn for_grid(data_type: DataType, grid: &RasterGrid) -> Option<Self> {
        let base = data_type.base();
        match base {
            DataType::LandCover => None,
            DataType::Precipitation | DataType::Population => grid
                .declared_range()
                .and_then(|(min, max)| Self::new(min, max).ok())
                .or_else(|| Self::default_for(base)),
            _ => {
                let (min, max) = grid
                    .values()
                    .iter()
                    .filter(|&&v| is_valid_value(base, v))
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                        (min.min(v), max.max(v))
                    });
                Self::new(min, max).ok().or_else(|| Self::default_for(base))
            }
        }
    }

    /// Zero-width, inverted or non-finite ranges.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.max - self.min > f32::EPSILON)
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    ///
    /// A degenerate range maps everything to mid-scale.
    pub fn normalize(&self, value: f32) -> f32 {
        if self.is_degenerate() {
            return 0.5;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Index of the equal-width bucket holding `value`; out-of-range values
    /// clamp to the first or last bucket.
    pub fn bucket(&self, value: f32, buckets: usize) -> usize {
        if buckets == 0 {
            return 0;
        }
        if self.is_degenerate() {
            return buckets / 2;
        }
        let t = (value - self.min) / (self.max - self.min);
        ((t * buckets as f32).floor().max(0.0) as usize).min(buckets - 1)
    }

    /// Lower and upper bound of bucket `index`.
    pub fn bucket_bounds(&self, index: usize, buckets: usize) -> (f32, f32) {
        let width = (self.max - self.min) / buckets.max(1) as f32;
        (
            self.min + width * index as f32,
            self.min + width * (index + 1) as f32,
        )
    }
}

/// Precomputed per-type color scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassificationScale {
    /// Land cover class table lookup.
    Categorical,
    /// Fixed palette quantized across the range.
    Quantized {
        palette: &'static [Rgba],
        range: ValueRange,
    },
    /// Linear ramp across the range, with sentinel exclusion.
    Normalized {
        ramp: &'static [Rgba],
        range: ValueRange,
        data_type: DataType,
    },
}

impl ClassificationScale {
    pub fn for_data_type(data_type: DataType, range: Option<ValueRange>) -> Self {
        let base = data_type.base();
        let range = range
            .or_else(|| ValueRange::default_for(base))
            .unwrap_or(ValueRange { min: 0.0, max: 1.0 });

        match base {
            DataType::Precipitation => Self::Quantized {
                palette: &PRECIPITATION_PALETTE,
                range,
            },
            DataType::Vegetation => Self::Normalized {
                ramp: &VEGETATION_RAMP,
                range,
                data_type: base,
            },
            DataType::Population => Self::Normalized {
                ramp: &POPULATION_RAMP,
                range,
                data_type: base,
            },
            _ => Self::Categorical,
        }
    }

    pub fn color(&self, value: f32) -> Rgba {
        if value.is_nan() {
            return NO_DATA;
        }

        match self {
            Self::Categorical => land_cover_class(value).map_or(FALLBACK, |c| c.color),
            Self::Quantized { palette, range } => palette
                .get(range.bucket(value, palette.len()))
                .copied()
                .unwrap_or(NO_DATA),
            Self::Normalized {
                ramp,
                range,
                data_type,
            } => {
                if !is_valid_value(*data_type, value) {
                    return NO_DATA;
                }
                ramp_color(ramp, range.normalize(value))
            }
        }
    }
}

/// Map one raw value to a color.
///
/// `min` and `max` are ignored for land cover. A degenerate range paints
/// the middle of the scale.
pub fn color_for(data_type: DataType, value: f32, min: f32, max: f32) -> Rgba {
    ClassificationScale::for_data_type(data_type, Some(ValueRange { min, max })).color(value)
}
