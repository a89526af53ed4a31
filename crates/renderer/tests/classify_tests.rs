//! Tests for value classification across every data type.

use renderer::classify::{
    color_for, ClassificationScale, ValueRange, LAND_COVER_CLASSES, NO_DATA, POPULATION_FILL,
    VEGETATION_FILL,
};
use sahel_common::DataType;
use test_utils::{create_precipitation_grid, create_vegetation_grid, grid_from};

const PROBES: [f32; 14] = [
    f32::NAN,
    f32::INFINITY,
    f32::NEG_INFINITY,
    f32::MIN,
    f32::MAX,
    -9999.0,
    -1.0,
    0.0,
    0.4,
    7.0,
    13.5,
    450.0,
    65533.0,
    1.0e9,
];

// ============================================================================
// Totality
// ============================================================================

#[test]
fn test_every_type_colors_every_value() {
    for data_type in DataType::ALL {
        for &(min, max) in &[(0.0, 100.0), (5.0, 5.0), (10.0, 1.0), (f32::NAN, f32::NAN)] {
            for value in PROBES {
                // Must not panic; the result is always some color
                let _ = color_for(data_type, value, min, max);
            }
        }
    }
}

#[test]
fn test_nan_is_no_data_for_every_type() {
    for data_type in DataType::ALL {
        assert_eq!(color_for(data_type, f32::NAN, 0.0, 100.0), NO_DATA);
    }
}

#[test]
fn test_no_data_color_never_valid() {
    for class in LAND_COVER_CLASSES {
        assert_ne!(class.color, NO_DATA);
    }
    for data_type in DataType::ALL {
        for step in 0..=100 {
            let value = 1.0 + step as f32;
            let color = color_for(data_type, value, 1.0, 101.0);
            assert_ne!(color, NO_DATA, "{} at {}", data_type, value);
        }
    }
}

#[test]
fn test_sentinels_map_to_no_data() {
    assert_eq!(color_for(DataType::Vegetation, VEGETATION_FILL, 0.0, 1.0), NO_DATA);
    assert_eq!(color_for(DataType::VegetationGradient, VEGETATION_FILL, 0.0, 1.0), NO_DATA);
    assert_eq!(color_for(DataType::Population, POPULATION_FILL, 0.0, 1.0), NO_DATA);
    assert_eq!(color_for(DataType::Population, 0.0, 0.0, 1.0), NO_DATA);
}

// ============================================================================
// Land cover
// ============================================================================

#[test]
fn test_blended_class_ids_round() {
    // Blending forest (7) and urban (13) halfway lands on grasslands (10)
    let blended = 7.0 + (13.0 - 7.0) * 0.5;
    assert_eq!(
        color_for(DataType::LandCover, blended, 0.0, 0.0),
        LAND_COVER_CLASSES[10].color
    );
}

#[test]
fn test_gradient_variant_shares_palette() {
    for class in LAND_COVER_CLASSES {
        let value = class.id as f32;
        assert_eq!(
            color_for(DataType::LandCover, value, 0.0, 0.0),
            color_for(DataType::LandCoverGradient, value, 0.0, 0.0)
        );
    }
}

// ============================================================================
// Value ranges
// ============================================================================

#[test]
fn test_range_uses_declared_bounds() {
    let grid = create_precipitation_grid(8, 8, 1);
    let range = ValueRange::for_grid(DataType::Precipitation, &grid).unwrap();
    assert_eq!((range.min, range.max), (0.0, 1000.0));

    // No declared bounds falls back to the default domain
    let bare = grid_from(2, 1, &[1.0, 2.0]);
    assert_eq!(
        ValueRange::for_grid(DataType::Population, &bare),
        ValueRange::default_for(DataType::Population)
    );
}

#[test]
fn test_vegetation_range_skips_sentinels() {
    let grid = grid_from(4, 1, &[VEGETATION_FILL, 12.0, -3.0, 48.0]);
    let range = ValueRange::for_grid(DataType::Vegetation, &grid).unwrap();
    assert_eq!((range.min, range.max), (12.0, 48.0));

    let ramp = create_vegetation_grid(10, 2, 100.0, 900.0);
    let range = ValueRange::for_grid(DataType::VegetationGradient, &ramp).unwrap();
    assert_eq!((range.min, range.max), (100.0, 900.0));
}

#[test]
fn test_land_cover_has_no_range() {
    let grid = grid_from(2, 1, &[1.0, 2.0]);
    assert!(ValueRange::for_grid(DataType::LandCover, &grid).is_none());
    assert_eq!(
        ClassificationScale::for_data_type(DataType::LandCover, None),
        ClassificationScale::Categorical
    );
}
