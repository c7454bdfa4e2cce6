//! Dataset import shape

use serde::{Deserialize, Serialize};

/// A named coastline polyline as handed over by a dataset loader.
///
/// Coordinates are `(longitude, latitude)` pairs in WGS84 degrees, the
/// GeoJSON axis order. Nothing is validated here; the segment store does
/// that when it cuts the line into segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub name: String,
    pub coordinates: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(name: impl Into<String>, coordinates: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }
}
