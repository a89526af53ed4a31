//! Supported raster data types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::SahelError;

/// Raster data types shown on the map.
///
/// Gradient variants are presentation-level derivations of a base type: they
/// share the base type's raster assets and cache entries and only differ in
/// how they are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    LandCover,
    Vegetation,
    Precipitation,
    Population,
    LandCoverGradient,
    VegetationGradient,
    PrecipitationGradient,
}

impl DataType {
    /// Every supported data type, base types first.
    pub const ALL: [DataType; 7] = [
        DataType::LandCover,
        DataType::Vegetation,
        DataType::Precipitation,
        DataType::Population,
        DataType::LandCoverGradient,
        DataType::VegetationGradient,
        DataType::PrecipitationGradient,
    ];

    /// Identifier used in asset names and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::LandCover => "landCover",
            DataType::Vegetation => "vegetation",
            DataType::Precipitation => "precipitation",
            DataType::Population => "population",
            DataType::LandCoverGradient => "landCoverGradient",
            DataType::VegetationGradient => "vegetationGradient",
            DataType::PrecipitationGradient => "precipitationGradient",
        }
    }

    /// The type whose rasters this type is rendered from.
    pub fn base(&self) -> DataType {
        match self {
            DataType::LandCoverGradient => DataType::LandCover,
            DataType::VegetationGradient => DataType::Vegetation,
            DataType::PrecipitationGradient => DataType::Precipitation,
            other => *other,
        }
    }

    pub fn is_gradient(&self) -> bool {
        self.base() != *self
    }

    /// Land cover holds class ids rather than measurements.
    pub fn is_categorical(&self) -> bool {
        self.base() == DataType::LandCover
    }

    /// Whether the color scale comes from bounds declared with the raster
    /// instead of being computed from the cell values.
    pub fn uses_declared_range(&self) -> bool {
        matches!(self.base(), DataType::Precipitation | DataType::Population)
    }

    /// Whether paint-time smoothing applies to this type.
    ///
    /// Plain land cover is a hard per-cell fill; every continuous type and
    /// every gradient variant is smoothed.
    pub fn smoothing(&self) -> bool {
        *self != DataType::LandCover
    }

    /// Native-resolution multiplier for the pixel buffer.
    pub fn render_scale(&self) -> usize {
        if self.smoothing() {
            2
        } else {
            1
        }
    }

    /// Asset name for one year, e.g. `landCover_2015`.
    ///
    /// Gradient variants resolve to their base type's asset.
    pub fn asset_key(&self, year: i32) -> String {
        format!("{}_{}", self.base().as_str(), year)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SahelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .iter()
            .copied()
            .find(|dt| dt.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SahelError::UnknownDataType(s.to_string()))
    }
}
