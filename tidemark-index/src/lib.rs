//! Coastline segment storage and spatial indexing
//!
//! # Architecture
//!
//! - [`SegmentStore`] - arena of segments cut from the input polylines, each
//!   pointing back at its feature
//! - [`SpatialIndex`] - bulk-loaded R-tree over segment boxes, walked
//!   best-first to produce [`Candidates`] in increasing lower-bound order
//!
//! Both are built once and are read-only afterwards.

pub mod spatial;
pub mod store;

pub use spatial::{Candidate, Candidates, SpatialIndex};
pub use store::{BuildReport, Feature, FeatureId, IndexBuildError, Segment, SegmentId, SegmentStore};
pub use tidemark_common::Polyline;
