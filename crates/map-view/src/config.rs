//! Map view configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use renderer::DisplaySize;
use sahel_common::{DataType, Year, KNOWN_YEARS};

/// Longest accepted transition.
const MAX_TRANSITION_MS: u64 = 60_000;

/// Configuration for a [`MapView`](crate::MapView).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Length of a year-to-year transition in milliseconds.
    pub transition_ms: u64,

    /// Data type shown first.
    pub initial_data_type: DataType,

    /// Year shown first.
    pub initial_year: Year,

    /// Seed for the reveal pattern. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// On-screen size of the canvas. `None` displays at native size.
    pub display: Option<DisplaySize>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            transition_ms: 1000,
            initial_data_type: DataType::LandCover,
            initial_year: KNOWN_YEARS.end,
            seed: None,
            display: None,
        }
    }
}

impl ViewConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SAHEL_TRANSITION_MS") {
            if let Ok(ms) = val.parse() {
                config.transition_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("SAHEL_DATA_TYPE") {
            if let Ok(data_type) = val.parse() {
                config.initial_data_type = data_type;
            }
        }

        if let Ok(val) = std::env::var("SAHEL_YEAR") {
            if let Ok(year) = val.parse() {
                config.initial_year = year;
            }
        }

        if let Ok(val) = std::env::var("SAHEL_SEED") {
            config.seed = val.parse().ok();
        }

        let width = std::env::var("SAHEL_DISPLAY_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok());
        let height = std::env::var("SAHEL_DISPLAY_HEIGHT")
            .ok()
            .and_then(|v| v.parse().ok());
        if let (Some(width), Some(height)) = (width, height) {
            config.display = Some(DisplaySize { width, height });
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.transition_ms > MAX_TRANSITION_MS {
            return Err(format!(
                "transition_ms {} exceeds {}",
                self.transition_ms, MAX_TRANSITION_MS
            ));
        }

        if let Some(display) = self.display {
            if !(display.width > 0.0 && display.height > 0.0) {
                return Err(format!(
                    "display size {}x{} must be positive",
                    display.width, display.height
                ));
            }
        }

        Ok(())
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}
