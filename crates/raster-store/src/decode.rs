//! Raster asset decoding.
//!
//! Assets are opaque byte streams; this module turns them into a flat value
//! array plus dimensions. Cells flagged as no-data by the asset itself become
//! `NaN`, which the colorizer paints as no data.

use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use sahel_common::RasterGrid;

use crate::config::RasterFormat;
use crate::error::{StoreError, StoreResult};

/// JSON raster document.
///
/// `null` entries in `values` are no-data cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterDocument {
    pub width: usize,
    pub height: usize,
    pub values: Vec<Option<f32>>,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
}

impl RasterDocument {
    pub fn into_grid(self) -> StoreResult<RasterGrid> {
        let values = self
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect();
        Ok(RasterGrid::new(self.width, self.height, values)?.with_declared_range(self.min, self.max))
    }
}

/// Decode raster bytes in the given format.
pub fn decode_raster(bytes: &[u8], format: RasterFormat) -> StoreResult<RasterGrid> {
    match format {
        RasterFormat::GeoTiff => decode_geotiff(bytes),
        RasterFormat::Json => decode_json(bytes),
    }
}

/// Decode a JSON raster document.
pub fn decode_json(bytes: &[u8]) -> StoreResult<RasterGrid> {
    let document: RasterDocument = serde_json::from_slice(bytes)?;
    document.into_grid()
}

/// Decode a single-band GeoTIFF.
pub fn decode_geotiff(bytes: &[u8]) -> StoreResult<RasterGrid> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let no_data = read_nodata_value(&mut decoder);

    let values = sample_values(decoder.read_image()?);
    let cells = width as usize * height as usize;
    if values.len() != cells {
        return Err(StoreError::decode(format!(
            "expected a single band of {} samples, got {}",
            cells,
            values.len()
        )));
    }

    let values = match no_data {
        Some(no_data) => values
            .into_iter()
            .map(|v| if v == no_data { f32::NAN } else { v })
            .collect(),
        None => values,
    };

    Ok(RasterGrid::new(width as usize, height as usize, values)?)
}

fn sample_values(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
    }
}

/// Value of the GDAL_NODATA tag (42113), stored as an ASCII string.
fn read_nodata_value<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse().ok())
}
