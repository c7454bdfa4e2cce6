//! Common types for the tidemark coastline query toolkit

pub mod error;
pub mod point;
pub mod polyline;

pub use error::InputError;
pub use point::GeoPoint;
pub use polyline::Polyline;
