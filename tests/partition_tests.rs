//! Tests for geographic partitioning of a service area
//!
//! These tests verify the documented grid layout (row 0 south, names
//! row-major), the dimension checks and, as properties, that the produced
//! cells tile the bounding box exactly.

mod common;

use cdr_synth::geo::{partition, BoundingBox};
use cdr_synth::simulation::ConfigurationError;
use cdr_synth::types::TechnologyId;
use common::names;
use proptest::prelude::*;

/// Lat [10, 12] x lon [20, 22] split 2x2 with names A, B, C, D
#[test]
fn test_two_by_two_end_to_end() {
    let bbox = BoundingBox::new(10.0, 12.0, 20.0, 22.0).unwrap();
    let grid = partition(&bbox, 2, 2, &names(&["A", "B", "C", "D"]), TechnologyId::FourG).unwrap();

    let bounds: Vec<(&str, f64, f64, f64, f64)> = grid
        .cells()
        .iter()
        .map(|c| (c.name.as_str(), c.lat_min, c.lat_max, c.lon_min, c.lon_max))
        .collect();

    assert_eq!(
        bounds,
        vec![
            ("A", 10.0, 11.0, 20.0, 21.0),
            ("B", 10.0, 11.0, 21.0, 22.0),
            ("C", 11.0, 12.0, 20.0, 21.0),
            ("D", 11.0, 12.0, 21.0, 22.0),
        ]
    );
    assert!(grid.cells().iter().all(|c| c.technology == TechnologyId::FourG));
    assert_eq!(grid.position("C"), Some(2));
    assert_eq!(grid.locate(11.5, 20.5), Some(2));
}

/// Name count must equal rows x cols
#[test]
fn test_dimension_check() {
    let bbox = BoundingBox::new(10.0, 12.0, 20.0, 22.0).unwrap();

    for (rows, cols) in [(1usize, 1usize), (2, 3), (3, 2), (4, 4)] {
        let expected = rows * cols;
        let wrong: Vec<String> = (0..expected + 1).map(|i| format!("L{}", i)).collect();
        let err = partition(&bbox, rows, cols, &wrong, TechnologyId::ThreeG).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DimensionMismatch {
                technology: TechnologyId::ThreeG,
                rows,
                cols,
                expected,
                actual: expected + 1,
            }
        );

        let right: Vec<String> = (0..expected).map(|i| format!("L{}", i)).collect();
        assert_eq!(partition(&bbox, rows, cols, &right, TechnologyId::ThreeG).unwrap().len(), expected);
    }
}

/// A zero split factor is an invalid bound, whatever the names
#[test]
fn test_zero_split_is_invalid_bounds() {
    let bbox = BoundingBox::new(10.0, 12.0, 20.0, 22.0).unwrap();
    for cols in [0usize, 1, 5] {
        let err = partition(&bbox, 0, cols, &[], TechnologyId::TwoG).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { technology: TechnologyId::TwoG, .. }));
    }
    let err = partition(&bbox, 3, 0, &names(&["A"]), TechnologyId::TwoG).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
}

/// Inverted boxes are rejected before names are looked at
#[test]
fn test_inverted_box_rejected() {
    let bbox = BoundingBox { lat_min: 12.0, lat_max: 10.0, lon_min: 20.0, lon_max: 22.0 };
    let err = partition(&bbox, 2, 2, &names(&["A", "B", "C", "D"]), TechnologyId::FiveG).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
}

fn grid_inputs() -> impl Strategy<Value = (f64, f64, f64, f64, usize, usize)> {
    (-80.0f64..70.0, 0.01f64..10.0, -170.0f64..160.0, 0.01f64..10.0, 1usize..12, 1usize..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Cells tile the box: outer edges match it and neighbours share edges exactly
    #[test]
    fn prop_partition_tiles_box_exactly(
        (lat_min, lat_span, lon_min, lon_span, rows, cols) in grid_inputs()
    ) {
        let bbox = BoundingBox::new(lat_min, lat_min + lat_span, lon_min, lon_min + lon_span).unwrap();
        let labels: Vec<String> = (0..rows * cols).map(|i| format!("L{}", i)).collect();
        let grid = partition(&bbox, rows, cols, &labels, TechnologyId::FourG).unwrap();

        prop_assert_eq!(grid.len(), rows * cols);

        for row in 0..rows {
            for col in 0..cols {
                let cell = grid.cell_at(row, col).unwrap();
                prop_assert_eq!(&cell.name, &labels[row * cols + col]);
                prop_assert!(cell.lat_min < cell.lat_max);
                prop_assert!(cell.lon_min < cell.lon_max);

                if row == 0 { prop_assert_eq!(cell.lat_min, bbox.lat_min); }
                if row == rows - 1 { prop_assert_eq!(cell.lat_max, bbox.lat_max); }
                if col == 0 { prop_assert_eq!(cell.lon_min, bbox.lon_min); }
                if col == cols - 1 { prop_assert_eq!(cell.lon_max, bbox.lon_max); }

                if row + 1 < rows {
                    let north = grid.cell_at(row + 1, col).unwrap();
                    prop_assert_eq!(cell.lat_max, north.lat_min);
                    prop_assert_eq!((cell.lon_min, cell.lon_max), (north.lon_min, north.lon_max));
                }
                if col + 1 < cols {
                    let east = grid.cell_at(row, col + 1).unwrap();
                    prop_assert_eq!(cell.lon_max, east.lon_min);
                    prop_assert_eq!((cell.lat_min, cell.lat_max), (east.lat_min, east.lat_max));
                }
            }
        }
    }

    /// Every point of the box falls in exactly one cell, and that cell contains it
    #[test]
    fn prop_points_locate_in_one_cell(
        (lat_min, lat_span, lon_min, lon_span, rows, cols) in grid_inputs(),
        lat_frac in 0.0f64..=1.0,
        lon_frac in 0.0f64..=1.0,
    ) {
        let bbox = BoundingBox::new(lat_min, lat_min + lat_span, lon_min, lon_min + lon_span).unwrap();
        let labels: Vec<String> = (0..rows * cols).map(|i| format!("L{}", i)).collect();
        let grid = partition(&bbox, rows, cols, &labels, TechnologyId::TwoG).unwrap();

        let lat = (bbox.lat_min + lat_span * lat_frac).min(bbox.lat_max);
        let lon = (bbox.lon_min + lon_span * lon_frac).min(bbox.lon_max);

        let index = grid.locate(lat, lon).unwrap();
        let cell = grid.get(index).unwrap();
        prop_assert!(cell.lat_min <= lat && lat <= cell.lat_max);
        prop_assert!(cell.lon_min <= lon && lon <= cell.lon_max);

        let containing = grid
            .cells()
            .iter()
            .filter(|c| {
                let lat_in = c.lat_min <= lat && (lat < c.lat_max || (c.row == rows - 1 && lat == c.lat_max));
                let lon_in = c.lon_min <= lon && (lon < c.lon_max || (c.col == cols - 1 && lon == c.lon_max));
                lat_in && lon_in
            })
            .count();
        prop_assert_eq!(containing, 1);
    }
}
