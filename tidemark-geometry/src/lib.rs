//! Geometry primitives for nearest-coastline queries
//!
//! - [`geodesy`] - Vincenty inverse on the WGS84 ellipsoid
//! - [`bbox`] - lat/lon boxes with a geodesic lower bound for pruning
//! - [`projection`] - clamped nearest point on a segment

pub mod bbox;
pub mod geodesy;
pub mod projection;

pub use bbox::BoundingBox;
pub use geodesy::{Ellipsoid, GeodesyError, Inverse, WGS84};
pub use projection::{project_onto_segment, Projection};
