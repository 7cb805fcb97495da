//! Named rectangles of a technology's location grid

use crate::types::TechnologyId;
use serde::{Deserialize, Serialize};

/// A named rectangular area within a technology's service area
///
/// Cells are half-open: a cell contains `[lat_min, lat_max) x [lon_min, lon_max)`
/// except along the northern and eastern edges of the grid, which belong to
/// the last row and column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCell {
    /// Location name
    pub name: String,
    /// Technology whose grid this cell belongs to
    pub technology: TechnologyId,
    /// Southern edge
    pub lat_min: f64,
    /// Northern edge
    pub lat_max: f64,
    /// Western edge
    pub lon_min: f64,
    /// Eastern edge
    pub lon_max: f64,
    /// Row index, 0 being the southernmost band
    pub row: usize,
    /// Column index, 0 being the westernmost band
    pub col: usize,
}

impl LocationCell {
    /// Centre point as (latitude, longitude)
    pub fn center(&self) -> (f64, f64) {
        ((self.lat_min + self.lat_max) / 2.0, (self.lon_min + self.lon_max) / 2.0)
    }

    /// Area in square degrees
    pub fn area(&self) -> f64 {
        (self.lat_max - self.lat_min) * (self.lon_max - self.lon_min)
    }
}
