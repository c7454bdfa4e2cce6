//! JSON documents printed by the CLI

use serde::{Deserialize, Serialize};

use tidemark_common::GeoPoint;
use tidemark_geometry::BoundingBox;
use tidemark_index::{FeatureId, SegmentId};
use tidemark_query::{BatchItem, QueryEngine, QueryError};

/// `--points` file, the request body shape: `{"coordinates": [...]}`
#[derive(Debug, Deserialize)]
pub struct PointsRequest {
    pub coordinates: Vec<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub results: Vec<ResponseItem>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseItem {
    Found(Found),
    Failed(Failed),
}

#[derive(Debug, Serialize)]
pub struct Found {
    pub index: usize,
    pub location: GeoPoint,
    pub distance_km: f64,
    pub nearest_coast_point: GeoPoint,
    pub feature_id: FeatureId,
    pub feature_name: Option<String>,
    pub segment_id: SegmentId,
    pub azimuth_deg: f64,
}

#[derive(Debug, Serialize)]
pub struct Failed {
    pub index: usize,
    pub error: ErrorDescriptor,
}

#[derive(Debug, Serialize)]
pub struct ErrorDescriptor {
    pub kind: &'static str,
    pub message: String,
}

impl From<&QueryError> for ErrorDescriptor {
    fn from(err: &QueryError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl QueryResponse {
    pub fn from_batch(engine: &QueryEngine, items: &[BatchItem]) -> Self {
        let results = items
            .iter()
            .map(|item| match &item.result {
                Ok(result) => ResponseItem::Found(Found {
                    index: item.index,
                    location: result.query,
                    distance_km: result.distance_km,
                    nearest_coast_point: result.nearest_point,
                    feature_id: result.feature_id,
                    feature_name: engine.feature_name(result).map(str::to_owned),
                    segment_id: result.segment_id,
                    azimuth_deg: result.azimuth_deg,
                }),
                Err(err) => ResponseItem::Failed(Failed {
                    index: item.index,
                    error: err.into(),
                }),
            })
            .collect();

        Self { results }
    }
}

/// Output of `tidemark stats`
#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub features: usize,
    pub segments: usize,
    pub features_skipped: usize,
    pub degenerate_segments_dropped: usize,
    pub bounds: Option<BoundingBox>,
    pub skipped: Vec<String>,
}

impl DatasetStats {
    pub fn of(engine: &QueryEngine) -> Self {
        let report = engine.store().report();
        Self {
            features: report.features_accepted,
            segments: engine.store().len(),
            features_skipped: report.features_skipped(),
            degenerate_segments_dropped: report.degenerate_segments_dropped,
            bounds: engine.index().bounds(),
            skipped: report.skipped.iter().map(ToString::to_string).collect(),
        }
    }
}
