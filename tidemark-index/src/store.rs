//! Segment store - immutable arena of coastline segments
//!
//! Every input polyline becomes one [`Feature`] owning a contiguous run of
//! [`SegmentId`]s. Malformed polylines are skipped whole and reported;
//! zero-length segments are dropped and counted.

use std::ops::{Index, Range};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use tidemark_common::{GeoPoint, InputError, Polyline};
use tidemark_geometry::BoundingBox;

/// Index of a feature in the store, in input order of accepted polylines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FeatureId(pub u32);

/// Index of a segment in the store arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SegmentId(pub u32);

impl SegmentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FeatureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Straight piece of coastline between two distinct vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub feature: FeatureId,
}

impl Segment {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::of_segment(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub segments: Range<u32>,
}

/// Reason a polyline was left out of the store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexBuildError {
    #[error("feature '{feature}' has {points} point(s), at least 2 are needed")]
    TooFewPoints { feature: String, points: usize },

    #[error("feature '{feature}' vertex {position}: {source}")]
    InvalidCoordinate {
        feature: String,
        position: usize,
        source: InputError,
    },

    #[error("feature '{feature}' has only zero-length segments")]
    Collapsed { feature: String },

    #[error("feature '{feature}' does not fit: segment arena is full")]
    CapacityExceeded { feature: String },
}

/// What happened to the input while building the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub features_accepted: usize,
    pub degenerate_segments_dropped: usize,
    pub skipped: Vec<IndexBuildError>,
}

impl BuildReport {
    pub fn features_skipped(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    features: Vec<Feature>,
    report: BuildReport,
}

impl SegmentStore {
    /// Cut polylines into segments.
    pub fn build<I>(polylines: I) -> Self
    where
        I: IntoIterator<Item = Polyline>,
    {
        let mut store = SegmentStore::default();

        for polyline in polylines {
            if let Err(err) = store.push_polyline(polyline) {
                store.report.skipped.push(err);
            }
        }

        store.segments.shrink_to_fit();
        store.features.shrink_to_fit();

        let report = &store.report;
        if report.degenerate_segments_dropped > 0 {
            info!(
                dropped = report.degenerate_segments_dropped,
                "dropped zero-length coastline segments"
            );
        }
        if !report.skipped.is_empty() {
            warn!(
                skipped = report.skipped.len(),
                first = %report.skipped[0],
                "skipped malformed coastline features"
            );
        }
        debug!(
            features = store.features.len(),
            segments = store.segments.len(),
            "segment store built"
        );

        store
    }

    fn push_polyline(&mut self, polyline: Polyline) -> Result<(), IndexBuildError> {
        let Polyline { name, coordinates } = polyline;

        if coordinates.len() < 2 {
            return Err(IndexBuildError::TooFewPoints {
                feature: name,
                points: coordinates.len(),
            });
        }

        let mut vertices = Vec::with_capacity(coordinates.len());
        for (position, &(lon, lat)) in coordinates.iter().enumerate() {
            match GeoPoint::from_lon_lat(lon, lat) {
                Ok(point) => vertices.push(point),
                Err(source) => {
                    return Err(IndexBuildError::InvalidCoordinate {
                        feature: name,
                        position,
                        source,
                    })
                }
            }
        }

        let feature_id = match u32::try_from(self.features.len()) {
            Ok(id) => FeatureId(id),
            Err(_) => return Err(IndexBuildError::CapacityExceeded { feature: name }),
        };

        let first = self.segments.len();
        let mut degenerate = 0;
        for pair in vertices.windows(2) {
            if pair[0] == pair[1] {
                degenerate += 1;
                continue;
            }
            self.segments.push(Segment {
                start: pair[0],
                end: pair[1],
                feature: feature_id,
            });
        }
        self.report.degenerate_segments_dropped += degenerate;

        let (Ok(start), Ok(end)) = (u32::try_from(first), u32::try_from(self.segments.len()))
        else {
            self.segments.truncate(first);
            return Err(IndexBuildError::CapacityExceeded { feature: name });
        };

        if start == end {
            return Err(IndexBuildError::Collapsed { feature: name });
        }

        self.features.push(Feature {
            name,
            segments: start..end,
        });
        self.report.features_accepted += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, seg)| (SegmentId(i as u32), seg))
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.index())
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }
}

impl Index<SegmentId> for SegmentStore {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }
}
