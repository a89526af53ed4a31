//! Raster asset fixtures.
//!
//! Encoders that produce the byte streams the asset loader expects, plus a
//! helper that lays out a temporary asset directory.

use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use sahel_common::{DataType, RasterGrid, Year};

/// Sentinel values used by the published Sahel assets.
pub mod sentinels {
    /// Vegetation productivity fill value.
    pub const VEGETATION_FILL: f32 = 65533.0;

    /// Population density no-data marker.
    pub const POPULATION_NO_DATA: f32 = -9999.0;
}

/// Encode a single-band 32-bit float GeoTIFF.
///
/// When `no_data` is set it is written to the GDAL_NODATA tag.
pub fn encode_geotiff(width: u32, height: u32, values: &[f32], no_data: Option<f32>) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut cursor).expect("tiff encoder");
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(width, height)
            .expect("tiff image");
        if let Some(no_data) = no_data {
            image
                .encoder()
                .write_tag(Tag::GdalNodata, no_data.to_string().as_str())
                .expect("nodata tag");
        }
        image.write_data(values).expect("tiff data");
    }
    cursor.into_inner()
}

/// Encode a grid as a JSON raster document. `NaN` cells become `null`.
pub fn json_raster(grid: &RasterGrid) -> Vec<u8> {
    let values: Vec<Option<f32>> = grid
        .values()
        .iter()
        .map(|v| if v.is_nan() { None } else { Some(*v) })
        .collect();
    let document = serde_json::json!({
        "width": grid.width(),
        "height": grid.height(),
        "values": values,
        "min": grid.declared_min(),
        "max": grid.declared_max(),
    });
    serde_json::to_vec(&document).expect("json raster")
}

/// Write a GeoTIFF asset named after the data type and year into `dir`.
pub fn write_geotiff_asset(dir: &Path, data_type: DataType, year: Year, grid: &RasterGrid) {
    let bytes = encode_geotiff(grid.width() as u32, grid.height() as u32, grid.values(), None);
    let path = dir.join(format!("{}.tif", data_type.asset_key(year)));
    std::fs::write(path, bytes).expect("write asset");
}

/// Create a temporary asset directory holding one GeoTIFF per year, each
/// filled with `value_for(year)`.
pub fn temp_asset_dir(
    data_type: DataType,
    years: impl IntoIterator<Item = Year>,
    width: usize,
    height: usize,
    value_for: impl Fn(Year) -> f32,
) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for year in years {
        let grid = crate::generators::uniform_grid(width, height, value_for(year));
        write_geotiff_asset(dir.path(), data_type, year, &grid);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::decoder::{Decoder, DecodingResult};

    #[test]
    fn test_encode_geotiff_is_readable() {
        let bytes = encode_geotiff(2, 2, &[1.0, 2.0, 3.0, 4.0], Some(-9999.0));
        let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (2, 2));
        let nodata = decoder
            .get_tag_ascii_string(Tag::GdalNodata)
            .unwrap();
        assert_eq!(nodata.trim_end_matches('\0'), "-9999");
        match decoder.read_image().unwrap() {
            DecodingResult::F32(data) => assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0]),
            other => panic!("unexpected sample type: {:?}", std::mem::discriminant(&other)),
        }
    }

    #[test]
    fn test_json_raster_nulls() {
        let grid = RasterGrid::new(2, 1, vec![1.0, f32::NAN]).unwrap();
        let text = String::from_utf8(json_raster(&grid)).unwrap();
        assert!(text.contains("null"));
    }
}
