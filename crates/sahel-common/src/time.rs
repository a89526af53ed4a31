//! Year handling for the temporal raster series.

use serde::{Deserialize, Serialize};

use crate::{SahelError, SahelResult};

/// A calendar year.
pub type Year = i32;

/// Years with published rasters in the current data release.
pub const KNOWN_YEARS: YearRange = YearRange { start: 2010, end: 2023 };

/// A closed interval of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Year,
    pub end: Year,
}

impl YearRange {
    pub fn new(start: Year, end: Year) -> SahelResult<Self> {
        if start > end {
            return Err(SahelError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: Year) -> bool {
        year >= self.start && year <= self.end
    }

    /// Iterate every year in the range in ascending order.
    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.start..=self.end
    }

    /// Number of years in the range; 0 for an inverted range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.end as i64 - self.start as i64 + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Clamp a (possibly fractional) year into the range. An inverted
    /// range clamps to `end`.
    pub fn clamp(&self, year: f64) -> f64 {
        year.max(self.start as f64).min(self.end as f64)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        KNOWN_YEARS
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
