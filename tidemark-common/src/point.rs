//! WGS84 geographic point

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// A point in WGS84 degrees.
///
/// The fields are public so request payloads can be deserialized as-is;
/// anything coming from outside should pass through [`GeoPoint::validate`]
/// before it reaches the geometry code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a validated point.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Build a point from a `(longitude, latitude)` pair, the GeoJSON axis order.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Result<Self, InputError> {
        Self::new(latitude, longitude)
    }

    /// Check the coordinate invariants.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(InputError::NotFinite {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InputError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InputError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude.to_radians()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_corners_of_the_range() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert_eq!(
            GeoPoint::new(999.0, 0.0),
            Err(InputError::LatitudeOutOfRange(999.0))
        );
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert_eq!(
            GeoPoint::new(0.0, 180.0001),
            Err(InputError::LongitudeOutOfRange(180.0001))
        );
    }

    #[test]
    fn rejects_non_finite_components() {
        assert!(matches!(
            GeoPoint::new(f64::NAN, 0.0),
            Err(InputError::NotFinite { .. })
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::INFINITY),
            Err(InputError::NotFinite { .. })
        ));
    }

    #[test]
    fn from_lon_lat_swaps_axis_order() {
        let p = GeoPoint::from_lon_lat(4.35, 50.85).unwrap();
        assert_eq!(p.latitude, 50.85);
        assert_eq!(p.longitude, 4.35);
    }

    #[test]
    fn display_is_lat_lon() {
        let p = GeoPoint::new(1.5, -2.25).unwrap();
        assert_eq!(p.to_string(), "(1.500000, -2.250000)");
    }
}
