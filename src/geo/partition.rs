//! Geo partitioning of a service area into a named location grid
//!
//! A bounding box is split into `rows` equal latitude bands and `cols` equal
//! longitude bands. Row 0 is the southernmost band and rows advance north;
//! columns advance east. Names are assigned row-major, so with a 2x2 grid and
//! names `[A, B, C, D]`, `A` is south-west, `B` south-east, `C` north-west and
//! `D` north-east.
//!
//! Band edges are computed once per axis and shared by neighbouring cells, so
//! adjacent cells meet exactly and the outermost edges equal the box edges.

use super::{BoundingBox, LocationCell};
use crate::simulation::error::{ConfigurationError, ValidationError};
use crate::types::TechnologyId;
use std::collections::HashMap;
use tracing::debug;

/// Largest number of cells a single grid may have
pub const MAX_CELLS: usize = 1_000_000;

/// Location grid of one technology
#[derive(Debug, Clone)]
pub struct GeoGrid {
    technology: TechnologyId,
    bbox: BoundingBox,
    rows: usize,
    cols: usize,
    lat_edges: Vec<f64>,
    lon_edges: Vec<f64>,
    cells: Vec<LocationCell>,
    by_name: HashMap<String, usize>,
}

/// Split `bbox` into a `rows x cols` grid of named cells
///
/// Bounds and split factors are checked before the name count, so an empty
/// box with a wrong number of names reports [`ConfigurationError::InvalidBounds`].
/// Grids above [`MAX_CELLS`] cells are rejected the same way.
pub fn partition(
    bbox: &BoundingBox,
    rows: usize,
    cols: usize,
    names: &[String],
    technology: TechnologyId,
) -> Result<GeoGrid, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBounds { technology, reason };

    if !(bbox.lat_min.is_finite()
        && bbox.lat_max.is_finite()
        && bbox.lon_min.is_finite()
        && bbox.lon_max.is_finite())
    {
        return Err(invalid("bounding box edges must be finite".to_string()));
    }
    if bbox.lat_min >= bbox.lat_max {
        return Err(invalid(format!(
            "latitude min {} must be below max {}",
            bbox.lat_min, bbox.lat_max
        )));
    }
    if bbox.lon_min >= bbox.lon_max {
        return Err(invalid(format!(
            "longitude min {} must be below max {}",
            bbox.lon_min, bbox.lon_max
        )));
    }
    if rows == 0 || cols == 0 {
        return Err(invalid(format!("split factors must be positive, got {}x{}", rows, cols)));
    }

    let expected = match rows.checked_mul(cols) {
        Some(cells) if cells <= MAX_CELLS => cells,
        _ => {
            return Err(invalid(format!(
                "grid too large: {}x{} exceeds {} cells",
                rows, cols, MAX_CELLS
            )))
        }
    };
    if names.len() != expected {
        return Err(ConfigurationError::DimensionMismatch {
            technology,
            rows,
            cols,
            expected,
            actual: names.len(),
        });
    }

    let mut by_name = HashMap::with_capacity(expected);
    for (index, name) in names.iter().enumerate() {
        let reason = if name.trim().is_empty() {
            Some(format!("location name at position {} is empty", index))
        } else if by_name.insert(name.clone(), index).is_some() {
            Some(format!("location name '{}' is used more than once", name))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigurationError::InvalidEntity {
                technology,
                source: ValidationError::InvalidValue {
                    field: "location_names".to_string(),
                    reason,
                },
            });
        }
    }

    let lat_edges = band_edges(bbox.lat_min, bbox.lat_max, rows);
    let lon_edges = band_edges(bbox.lon_min, bbox.lon_max, cols);

    let mut cells = Vec::with_capacity(expected);
    for row in 0..rows {
        for col in 0..cols {
            cells.push(LocationCell {
                name: names[row * cols + col].clone(),
                technology,
                lat_min: lat_edges[row],
                lat_max: lat_edges[row + 1],
                lon_min: lon_edges[col],
                lon_max: lon_edges[col + 1],
                row,
                col,
            });
        }
    }

    debug!(%technology, rows, cols, "Partitioned service area into {} cells", cells.len());

    Ok(GeoGrid { technology, bbox: *bbox, rows, cols, lat_edges, lon_edges, cells, by_name })
}

/// `bands + 1` monotonic edges from `min` to `max`, with both ends exact
fn band_edges(min: f64, max: f64, bands: usize) -> Vec<f64> {
    let span = max - min;
    let mut edges: Vec<f64> =
        (0..=bands).map(|i| min + span * (i as f64) / (bands as f64)).collect();
    edges[0] = min;
    edges[bands] = max;
    edges
}

impl GeoGrid {
    /// Technology this grid belongs to
    pub fn technology(&self) -> TechnologyId {
        self.technology
    }

    /// Service area covered by the grid
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Number of latitude bands
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of longitude bands
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[LocationCell] {
        &self.cells
    }

    /// Cell at a row-major index
    pub fn get(&self, index: usize) -> Option<&LocationCell> {
        self.cells.get(index)
    }

    /// Cell at a grid position
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&LocationCell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Row-major index of the cell with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Row-major index of the cell containing a coordinate
    ///
    /// Cells are half-open at their northern and eastern edges; points on the
    /// northern or eastern edge of the box belong to the last row or column.
    /// Returns `None` outside the box.
    pub fn locate(&self, latitude: f64, longitude: f64) -> Option<usize> {
        if !self.bbox.contains(latitude, longitude) {
            return None;
        }
        let row = self.lat_edges[1..self.rows].partition_point(|edge| *edge <= latitude);
        let col = self.lon_edges[1..self.cols].partition_point(|edge| *edge <= longitude);
        Some(row * self.cols + col)
    }

    /// Consume the grid, returning its cells
    pub fn into_cells(self) -> Vec<LocationCell> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_by_two_layout() {
        let bbox = BoundingBox::new(0.0, 2.0, 0.0, 2.0).unwrap();
        let grid =
            partition(&bbox, 2, 2, &names(&["A", "B", "C", "D"]), TechnologyId::FourG).unwrap();

        let a = grid.cell_at(0, 0).unwrap();
        assert_eq!(a.name, "A");
        assert_eq!((a.lat_min, a.lat_max, a.lon_min, a.lon_max), (0.0, 1.0, 0.0, 1.0));

        let b = grid.cell_at(0, 1).unwrap();
        assert_eq!(b.name, "B");
        assert_eq!((b.lat_min, b.lat_max, b.lon_min, b.lon_max), (0.0, 1.0, 1.0, 2.0));

        let c = grid.cell_at(1, 0).unwrap();
        assert_eq!(c.name, "C");
        assert_eq!((c.lat_min, c.lat_max, c.lon_min, c.lon_max), (1.0, 2.0, 0.0, 1.0));

        let d = grid.cell_at(1, 1).unwrap();
        assert_eq!(d.name, "D");
        assert_eq!((d.lat_min, d.lat_max, d.lon_min, d.lon_max), (1.0, 2.0, 1.0, 2.0));
    }

    #[test]
    fn test_locate_edges() {
        let bbox = BoundingBox::new(0.0, 2.0, 0.0, 2.0).unwrap();
        let grid =
            partition(&bbox, 2, 2, &names(&["A", "B", "C", "D"]), TechnologyId::TwoG).unwrap();

        assert_eq!(grid.locate(0.5, 0.5), Some(0));
        // Interior edges belong to the northern/eastern neighbour
        assert_eq!(grid.locate(1.0, 0.5), Some(2));
        assert_eq!(grid.locate(0.5, 1.0), Some(1));
        // Outer edges belong to the last row/column
        assert_eq!(grid.locate(2.0, 2.0), Some(3));
        assert_eq!(grid.locate(2.5, 1.0), None);
        assert_eq!(grid.position("C"), Some(2));
        assert_eq!(grid.position("Z"), None);
    }

    #[test]
    fn test_dimension_mismatch() {
        let bbox = BoundingBox::new(0.0, 2.0, 0.0, 2.0).unwrap();
        let err =
            partition(&bbox, 2, 2, &names(&["A", "B", "C"]), TechnologyId::ThreeG).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DimensionMismatch {
                technology: TechnologyId::ThreeG,
                rows: 2,
                cols: 2,
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_invalid_bounds_checked_first() {
        let bbox = BoundingBox { lat_min: 2.0, lat_max: 2.0, lon_min: 0.0, lon_max: 1.0 };
        let err = partition(&bbox, 2, 2, &names(&["A"]), TechnologyId::FiveG).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));

        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let err = partition(&bbox, 0, 2, &[], TechnologyId::FiveG).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let err = partition(&bbox, 1, 2, &names(&["A", "A"]), TechnologyId::FourG).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidEntity { .. }));
    }

    #[test]
    fn test_outer_edges_are_exact() {
        let bbox = BoundingBox::new(30.1, 37.3, 7.7, 11.9).unwrap();
        let names: Vec<String> = (0..21).map(|i| format!("L{}", i)).collect();
        let grid = partition(&bbox, 7, 3, &names, TechnologyId::FourG).unwrap();
        let last = grid.cells().last().unwrap();
        assert_eq!(last.lat_max.to_bits(), bbox.lat_max.to_bits());
        assert_eq!(last.lon_max.to_bits(), bbox.lon_max.to_bits());
        for cell in grid.cells() {
            if let Some(north) = grid.cell_at(cell.row + 1, cell.col) {
                assert_eq!(cell.lat_max.to_bits(), north.lat_min.to_bits());
            }
        }
    }

    #[test]
    fn test_oversized_split_rejected() {
        let bbox = BoundingBox::new(0.0, 2.0, 0.0, 2.0).unwrap();

        for (rows, cols) in [(usize::MAX, 2), (2, usize::MAX), (1_001, 1_000)] {
            let err = partition(&bbox, rows, cols, &[], TechnologyId::FourG).unwrap_err();
            match err {
                ConfigurationError::InvalidBounds { technology, reason } => {
                    assert_eq!(technology, TechnologyId::FourG);
                    assert!(reason.contains("grid too large"), "{}", reason);
                }
                other => panic!("unexpected error: {}", other),
            }
        }

        // At the cap the name count is checked as usual
        let err = partition(&bbox, 1_000, 1_000, &[], TechnologyId::FourG).unwrap_err();
        assert!(matches!(err, ConfigurationError::DimensionMismatch { expected: MAX_CELLS, actual: 0, .. }));
    }
}
