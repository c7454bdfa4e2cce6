//! Query-time errors

use thiserror::Error;
use tidemark_common::InputError;
use tidemark_geometry::GeodesyError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolverError {
    /// The index holds no segments; serving would only produce wrong answers
    #[error("coastline dataset has no segments")]
    EmptyDataset,

    #[error("no coastline within {radius_km} km")]
    NothingWithinRadius { radius_km: f64 },

    #[error("search radius must be a positive number of kilometers, got {0}")]
    InvalidSearchRadius(f64),

    #[error("spatial index holds {index_segments} segments but the store has {store_segments}")]
    IndexMismatch {
        store_segments: usize,
        index_segments: usize,
    },
}

/// Failure of a single query; lives in that query's batch slot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("invalid coordinate: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Geodesy(#[from] GeodesyError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

impl QueryError {
    /// Stable tag for serialized error descriptors
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Input(_) => "input",
            QueryError::Geodesy(_) => "geodesy",
            QueryError::Resolver(_) => "resolver",
        }
    }
}
