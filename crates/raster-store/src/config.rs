//! Configuration for raster loading.

use sahel_common::{DataType, Year, YearRange, KNOWN_YEARS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where raster assets are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLocation {
    /// A local directory of static assets.
    Directory(PathBuf),
    /// A static asset base URL.
    Url(String),
    /// An in-process store, filled by the caller.
    Memory,
}

impl Default for AssetLocation {
    fn default() -> Self {
        Self::Directory(PathBuf::from("public/rasters"))
    }
}

/// Encoding of the raster assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterFormat {
    /// Single-band GeoTIFF.
    GeoTiff,
    /// JSON document with width, height and a flat value array.
    Json,
}

impl Default for RasterFormat {
    fn default() -> Self {
        Self::GeoTiff
    }
}

impl RasterFormat {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::GeoTiff,
        }
    }

    /// File extension of assets in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::GeoTiff => "tif",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeoTiff => write!(f, "geotiff"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Configuration for the raster source and year cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend holding the assets.
    pub location: AssetLocation,

    /// Path prefix of the assets within the backend.
    pub prefix: String,

    /// Encoding of the assets.
    pub format: RasterFormat,

    /// Years published for every data type.
    pub years: YearRange,

    /// Per-type exceptions to `years`, keyed by base type.
    #[serde(default)]
    pub year_overrides: HashMap<DataType, YearRange>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: AssetLocation::default(),
            prefix: String::new(),
            format: RasterFormat::default(),
            years: KNOWN_YEARS,
            year_overrides: HashMap::new(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SAHEL_ASSET_DIR") {
            config.location = AssetLocation::Directory(PathBuf::from(val));
        }

        // A URL wins over a directory when both are set.
        if let Ok(val) = std::env::var("SAHEL_ASSET_URL") {
            config.location = AssetLocation::Url(val);
        }

        if let Ok(val) = std::env::var("SAHEL_ASSET_PREFIX") {
            config.prefix = val;
        }

        if let Ok(val) = std::env::var("SAHEL_RASTER_FORMAT") {
            config.format = RasterFormat::from_str(&val);
        }

        if let Ok(val) = std::env::var("SAHEL_YEAR_START") {
            if let Ok(year) = val.parse() {
                config.years.start = year;
            }
        }

        if let Ok(val) = std::env::var("SAHEL_YEAR_END") {
            if let Ok(year) = val.parse() {
                config.years.end = year;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.years.start > self.years.end {
            return Err(format!("year range {} is empty", self.years));
        }

        for (data_type, range) in &self.year_overrides {
            if data_type.is_gradient() {
                return Err(format!(
                    "year override for {} must be set on {}",
                    data_type,
                    data_type.base()
                ));
            }
            if range.start > range.end {
                return Err(format!("year range {} for {} is empty", range, data_type));
            }
        }

        if let AssetLocation::Url(url) = &self.location {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("asset url '{}' must be http(s)", url));
            }
        }

        Ok(())
    }

    /// Published years for a data type.
    pub fn years_for(&self, data_type: DataType) -> YearRange {
        self.year_overrides
            .get(&data_type.base())
            .copied()
            .unwrap_or(self.years)
    }

    /// Asset path of one year's raster, relative to the backend root.
    pub fn asset_path(&self, data_type: DataType, year: Year) -> String {
        let name = format!("{}.{}", data_type.asset_key(year), self.format.extension());
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        }
    }
}
