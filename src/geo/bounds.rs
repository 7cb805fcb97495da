//! Rectangular service areas

use crate::simulation::error::ValidationError;
use crate::types::BoundingBoxConfig;
use serde::{Deserialize, Serialize};

/// Latitude/longitude rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge
    pub lat_min: f64,
    /// Northern edge
    pub lat_max: f64,
    /// Western edge
    pub lon_min: f64,
    /// Eastern edge
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a validated bounding box
    ///
    /// All edges must be finite, latitudes within [-90, 90] and longitudes
    /// within [-180, 180], with each minimum strictly below its maximum.
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<Self, ValidationError> {
        check_axis("latitude", lat_min, lat_max, 90.0)?;
        check_axis("longitude", lon_min, lon_max, 180.0)?;
        Ok(Self { lat_min, lat_max, lon_min, lon_max })
    }

    /// Height in degrees
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Width in degrees
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Whether the point lies inside the box, edges included
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

impl TryFrom<BoundingBoxConfig> for BoundingBox {
    type Error = ValidationError;

    fn try_from(config: BoundingBoxConfig) -> Result<Self, Self::Error> {
        let [lat_min, lat_max] = config.latitude;
        let [lon_min, lon_max] = config.longitude;
        Self::new(lat_min, lat_max, lon_min, lon_max)
    }
}

fn check_axis(axis: &str, min: f64, max: f64, limit: f64) -> Result<(), ValidationError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: axis.to_string(),
            reason: "bounds must be finite".to_string(),
        });
    }
    if min < -limit || max > limit {
        return Err(ValidationError::InvalidValue {
            field: axis.to_string(),
            reason: format!("bounds must lie within [-{}, {}]", limit, limit),
        });
    }
    if min >= max {
        return Err(ValidationError::InvalidRange { field: axis.to_string(), min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounding_box() {
        let bbox = BoundingBox::new(0.0, 2.0, 10.0, 14.0).unwrap();
        assert_eq!(bbox.lat_span(), 2.0);
        assert_eq!(bbox.lon_span(), 4.0);
        assert!(bbox.contains(0.0, 10.0));
        assert!(bbox.contains(2.0, 14.0));
        assert!(!bbox.contains(2.1, 12.0));
    }

    #[test]
    fn test_degenerate_bounding_box_rejected() {
        assert!(matches!(
            BoundingBox::new(1.0, 1.0, 0.0, 1.0),
            Err(ValidationError::InvalidRange { .. })
        ));
        assert!(matches!(
            BoundingBox::new(0.0, 1.0, 5.0, -5.0),
            Err(ValidationError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_out_of_world_bounding_box_rejected() {
        assert!(matches!(
            BoundingBox::new(-91.0, 0.0, 0.0, 1.0),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(matches!(
            BoundingBox::new(0.0, 1.0, 0.0, f64::NAN),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let config = BoundingBoxConfig { latitude: [30.0, 37.5], longitude: [7.5, 11.6] };
        let bbox = BoundingBox::try_from(config).unwrap();
        assert_eq!(bbox.lat_min, 30.0);
        assert_eq!(bbox.lon_max, 11.6);
    }
}
