//! Query engine - the process-wide, build-once state

use std::time::Instant;

use tracing::info;

use tidemark_common::{GeoPoint, Polyline};
use tidemark_index::{SegmentStore, SpatialIndex};

use crate::batch::{resolve_batch, BatchItem};
use crate::config::EngineConfig;
use crate::error::{QueryError, ResolverError};
use crate::resolver::{QueryResult, Resolver};

/// Segment store + spatial index + configuration.
///
/// Construction finishes the whole index before returning, so an engine
/// that exists is ready to serve. It is never mutated afterwards.
pub struct QueryEngine {
    store: SegmentStore,
    index: SpatialIndex,
    config: EngineConfig,
}

impl QueryEngine {
    /// Build from polylines.
    ///
    /// Fails with [`ResolverError::EmptyDataset`] if nothing usable is left
    /// after dropping malformed features.
    pub fn build<I>(polylines: I, config: EngineConfig) -> Result<Self, ResolverError>
    where
        I: IntoIterator<Item = Polyline>,
    {
        Self::from_store(SegmentStore::build(polylines), config)
    }

    pub fn from_store(store: SegmentStore, config: EngineConfig) -> Result<Self, ResolverError> {
        config.validate()?;
        if store.is_empty() {
            return Err(ResolverError::EmptyDataset);
        }

        let start = Instant::now();
        let index = SpatialIndex::build(&store);

        info!(
            features = store.features().len(),
            segments = store.len(),
            skipped_features = store.report().features_skipped(),
            index_ms = start.elapsed().as_secs_f64() * 1000.0,
            "coastline index ready"
        );

        Ok(Self {
            store,
            index,
            config,
        })
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::assemble(
            &self.store,
            &self.index,
            self.config.max_search_radius_km.map(|km| km * 1000.0),
        )
    }

    pub fn resolve(&self, point: GeoPoint) -> Result<QueryResult, QueryError> {
        self.resolver().resolve(point)
    }

    pub fn resolve_exhaustive(&self, point: GeoPoint) -> Result<QueryResult, QueryError> {
        self.resolver().resolve_exhaustive(point)
    }

    pub fn resolve_batch(&self, points: &[GeoPoint]) -> Vec<BatchItem> {
        resolve_batch(
            &self.resolver(),
            points,
            self.config.runs_in_parallel(points.len()),
        )
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Name of the feature a result points at
    pub fn feature_name(&self, result: &QueryResult) -> Option<&str> {
        self.store
            .feature(result.feature_id)
            .map(|feature| feature.name.as_str())
    }
}
