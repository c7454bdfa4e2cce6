//! Nearest point on the coastline - branch and bound over the spatial index
//!
//! Candidates arrive in increasing lower-bound order. Each one is projected
//! in a local tangent plane to find the closest point on its segment, and
//! the geodesic distance to that point is what gets compared. The search
//! ends when the best distance found is below the lower bound of everything
//! still unexamined, so the answer equals an exhaustive scan.
//!
//! Ties on distance go to the lowest segment id in both modes.
//!
//! A candidate whose geodesic does not converge (nearly antipodal to the
//! query) is set aside with its lower bound. It only fails the query if
//! nothing found is provably closer than that bound.

use serde::Serialize;
use tracing::trace;

use tidemark_common::GeoPoint;
use tidemark_geometry::{project_onto_segment, Ellipsoid, GeodesyError, Inverse, WGS84};
use tidemark_index::{FeatureId, SegmentId, SegmentStore, SpatialIndex};

use crate::error::{QueryError, ResolverError};

/// Nearest coastline point for one query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: GeoPoint,
    pub nearest_point: GeoPoint,
    pub distance_km: f64,
    pub feature_id: FeatureId,
    pub segment_id: SegmentId,
    /// Forward azimuth from the query towards the nearest point
    pub azimuth_deg: f64,
}

/// Closest point found on one segment
#[derive(Debug, Clone, Copy)]
struct Hit {
    segment: SegmentId,
    point: GeoPoint,
    inverse: Inverse,
}

impl Hit {
    fn beats(&self, other: &Hit) -> bool {
        self.inverse.distance_m < other.inverse.distance_m
            || (self.inverse.distance_m == other.inverse.distance_m
                && self.segment < other.segment)
    }
}

/// Candidate the geodesic solver gave up on
struct Unresolved {
    lower_bound_m: f64,
    error: GeodesyError,
}

fn keep_best(best: &mut Option<Hit>, hit: Hit) {
    if best.as_ref().map_or(true, |current| hit.beats(current)) {
        *best = Some(hit);
    }
}

/// Resolves points against a segment store and its spatial index
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a SegmentStore,
    index: &'a SpatialIndex,
    ellipsoid: Ellipsoid,
    max_radius_m: Option<f64>,
}

impl<'a> Resolver<'a> {
    /// `index` must have been built from `store`; one of a different size is
    /// refused.
    pub fn new(store: &'a SegmentStore, index: &'a SpatialIndex) -> Result<Self, ResolverError> {
        if store.is_empty() || index.is_empty() {
            return Err(ResolverError::EmptyDataset);
        }
        if store.len() != index.len() {
            return Err(ResolverError::IndexMismatch {
                store_segments: store.len(),
                index_segments: index.len(),
            });
        }
        Ok(Self::assemble(store, index, None))
    }

    pub(crate) fn assemble(
        store: &'a SegmentStore,
        index: &'a SpatialIndex,
        max_radius_m: Option<f64>,
    ) -> Self {
        Self {
            store,
            index,
            ellipsoid: WGS84,
            max_radius_m,
        }
    }

    /// Only accept coastline within `radius_km`.
    pub fn with_search_radius_km(mut self, radius_km: f64) -> Result<Self, ResolverError> {
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(ResolverError::InvalidSearchRadius(radius_km));
        }
        self.max_radius_m = Some(radius_km * 1000.0);
        Ok(self)
    }

    /// Index-accelerated nearest point.
    pub fn resolve(&self, point: GeoPoint) -> Result<QueryResult, QueryError> {
        point.validate()?;
        if self.index.is_empty() {
            return Err(ResolverError::EmptyDataset.into());
        }

        let mut candidates = self.index.candidates(point);
        if let Some(radius_m) = self.max_radius_m {
            candidates = candidates.within(radius_m);
        }

        let mut best: Option<Hit> = None;
        let mut unresolved: Option<Unresolved> = None;
        let mut examined = 0usize;

        while let Some(bound) = candidates.next_bound() {
            if best.is_some_and(|hit| hit.inverse.distance_m < bound) {
                break;
            }
            let Some(candidate) = candidates.next() else {
                break;
            };
            examined += 1;
            match self.examine(point, candidate.segment) {
                Ok(hit) => keep_best(&mut best, hit),
                // Bounds only grow, so the first failure has the smallest one
                Err(error) => {
                    unresolved.get_or_insert(Unresolved {
                        lower_bound_m: candidate.lower_bound_m,
                        error,
                    });
                }
            }
        }

        trace!(
            %point,
            examined,
            nodes_opened = candidates.nodes_opened(),
            "resolved nearest coastline"
        );

        self.finish(point, best, unresolved)
    }

    /// Brute-force scan of every segment, same rules as [`Resolver::resolve`].
    pub fn resolve_exhaustive(&self, point: GeoPoint) -> Result<QueryResult, QueryError> {
        point.validate()?;
        if self.store.is_empty() {
            return Err(ResolverError::EmptyDataset.into());
        }

        let mut best: Option<Hit> = None;
        let mut unresolved: Option<Unresolved> = None;
        for (id, segment) in self.store.iter() {
            match self.examine(point, id) {
                Ok(hit) => keep_best(&mut best, hit),
                Err(error) => {
                    let lower_bound_m = segment.bbox().lower_bound_m(point);
                    if unresolved
                        .as_ref()
                        .map_or(true, |u| lower_bound_m < u.lower_bound_m)
                    {
                        unresolved = Some(Unresolved {
                            lower_bound_m,
                            error,
                        });
                    }
                }
            }
        }

        self.finish(point, best, unresolved)
    }

    fn examine(&self, point: GeoPoint, id: SegmentId) -> Result<Hit, GeodesyError> {
        let segment = &self.store[id];
        let foot = project_onto_segment(point, segment.start, segment.end).point;
        let inverse = self.ellipsoid.inverse(point, foot)?;
        Ok(Hit {
            segment: id,
            point: foot,
            inverse,
        })
    }

    fn finish(
        &self,
        point: GeoPoint,
        best: Option<Hit>,
        unresolved: Option<Unresolved>,
    ) -> Result<QueryResult, QueryError> {
        if let Some(u) = unresolved {
            let in_range = self.max_radius_m.map_or(true, |r| u.lower_bound_m <= r);
            let beaten = best.is_some_and(|hit| hit.inverse.distance_m < u.lower_bound_m);
            if in_range && !beaten {
                return Err(u.error.into());
            }
        }

        let hit = match (best, self.max_radius_m) {
            (Some(hit), Some(radius_m)) if hit.inverse.distance_m > radius_m => None,
            (best, _) => best,
        };

        let Some(hit) = hit else {
            return Err(match self.max_radius_m {
                Some(radius_m) => ResolverError::NothingWithinRadius {
                    radius_km: radius_m / 1000.0,
                },
                None => ResolverError::EmptyDataset,
            }
            .into());
        };

        Ok(QueryResult {
            query: point,
            nearest_point: hit.point,
            distance_km: hit.inverse.distance_km(),
            feature_id: self.store[hit.segment].feature,
            segment_id: hit.segment,
            azimuth_deg: hit.inverse.forward_azimuth_deg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_common::{InputError, Polyline};

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn build(lines: Vec<Polyline>) -> (SegmentStore, SpatialIndex) {
        let store = SegmentStore::build(lines);
        let index = SpatialIndex::build(&store);
        (store, index)
    }

    #[test]
    fn projection_beats_endpoint_comparison() {
        // Equator-parallel segment; the query sits above its middle, far
        // from both endpoints.
        let (store, index) = build(vec![Polyline::new("shore", vec![(0.0, 0.0), (10.0, 0.0)])]);
        let resolver = Resolver::new(&store, &index).unwrap();

        let result = resolver.resolve(p(1.0, 5.0)).unwrap();
        assert!((result.nearest_point.longitude - 5.0).abs() < 1e-9);
        assert_eq!(result.nearest_point.latitude, 0.0);
        // One degree of meridian at the equator
        assert!((result.distance_km - 110.574_389).abs() < 1e-3);
        assert!((result.azimuth_deg.abs() - 180.0).abs() < 1e-6);
    }

    #[test]
    fn point_on_the_coast_is_zero_distance() {
        let (store, index) = build(vec![Polyline::new("shore", vec![(0.0, 0.0), (0.0, 10.0)])]);
        let resolver = Resolver::new(&store, &index).unwrap();
        let result = resolver.resolve(p(0.0, 0.0)).unwrap();
        assert_eq!(result.distance_km, 0.0);
    }

    #[test]
    fn picks_the_right_feature() {
        let (store, index) = build(vec![
            Polyline::new("west", vec![(-10.0, -1.0), (-10.0, 1.0)]),
            Polyline::new("east", vec![(10.0, -1.0), (10.0, 1.0), (10.0, 2.0)]),
        ]);
        let resolver = Resolver::new(&store, &index).unwrap();

        let result = resolver.resolve(p(1.5, 8.0)).unwrap();
        assert_eq!(result.feature_id, FeatureId(1));
        assert_eq!(result.segment_id, SegmentId(2));
        assert_eq!(store.feature(result.feature_id).unwrap().name, "east");
    }

    #[test]
    fn invalid_query_is_an_input_error() {
        let (store, index) = build(vec![Polyline::new("shore", vec![(0.0, 0.0), (1.0, 0.0)])]);
        let resolver = Resolver::new(&store, &index).unwrap();
        let bad = GeoPoint {
            latitude: 999.0,
            longitude: 0.0,
        };
        assert_eq!(
            resolver.resolve(bad),
            Err(QueryError::Input(InputError::LatitudeOutOfRange(999.0)))
        );
        assert!(resolver.resolve_exhaustive(bad).is_err());
    }

    #[test]
    fn empty_store_refuses_to_build_a_resolver() {
        let (store, index) = build(Vec::new());
        assert!(matches!(
            Resolver::new(&store, &index),
            Err(ResolverError::EmptyDataset)
        ));
        // Assembled directly, queries still refuse to answer
        let resolver = Resolver::assemble(&store, &index, None);
        assert_eq!(
            resolver.resolve(p(0.0, 0.0)),
            Err(QueryError::Resolver(ResolverError::EmptyDataset))
        );
        assert_eq!(
            resolver.resolve_exhaustive(p(0.0, 0.0)),
            Err(QueryError::Resolver(ResolverError::EmptyDataset))
        );
    }

    #[test]
    fn search_radius_limits_the_answer() {
        let (store, index) = build(vec![Polyline::new("shore", vec![(0.0, 0.0), (0.0, 10.0)])]);
        let resolver = Resolver::new(&store, &index)
            .unwrap()
            .with_search_radius_km(100.0)
            .unwrap();

        // ~111 km east of the segment
        assert_eq!(
            resolver.resolve(p(5.0, 1.0)),
            Err(QueryError::Resolver(ResolverError::NothingWithinRadius {
                radius_km: 100.0
            }))
        );
        assert_eq!(
            resolver.resolve_exhaustive(p(5.0, 1.0)),
            resolver.resolve(p(5.0, 1.0))
        );
        // ~55 km is fine
        assert!(resolver.resolve(p(5.0, 0.5)).is_ok());
    }

    #[test]
    fn rejects_nonsense_radius() {
        let (store, index) = build(vec![Polyline::new("shore", vec![(0.0, 0.0), (0.0, 1.0)])]);
        let resolver = Resolver::new(&store, &index).unwrap();
        assert!(resolver.with_search_radius_km(0.0).is_err());
        assert!(resolver.with_search_radius_km(f64::NAN).is_err());
    }

    #[test]
    fn index_from_another_store_is_refused() {
        let (store, _) = build(vec![Polyline::new("a", vec![(0.0, 0.0), (1.0, 0.0)])]);
        let (_, other_index) = build(vec![Polyline::new(
            "b",
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)],
        )]);
        assert!(matches!(
            Resolver::new(&store, &other_index),
            Err(ResolverError::IndexMismatch {
                store_segments: 1,
                index_segments: 2
            })
        ));
    }

    #[test]
    fn antipodal_candidate_is_ignored_when_something_is_closer() {
        let (store, index) = build(vec![
            // Exact antipode of the query, the solver cannot handle it
            Polyline::new("antipode", vec![(179.9, 0.0), (180.0, 0.0)]),
            Polyline::new("near", vec![(1.0, -1.0), (1.0, 1.0)]),
        ]);
        let resolver = Resolver::new(&store, &index).unwrap();

        let fast = resolver.resolve(p(0.0, 0.0)).unwrap();
        assert_eq!(fast.feature_id, FeatureId(1));
        assert_eq!(resolver.resolve_exhaustive(p(0.0, 0.0)).unwrap(), fast);
    }

    #[test]
    fn antipodal_only_dataset_surfaces_non_convergence() {
        let (store, index) = build(vec![Polyline::new(
            "antipode",
            vec![(179.9, 0.0), (180.0, 0.0)],
        )]);
        let resolver = Resolver::new(&store, &index).unwrap();
        assert!(matches!(
            resolver.resolve(p(0.0, 0.0)),
            Err(QueryError::Geodesy(GeodesyError::NonConvergent { .. }))
        ));
        assert!(matches!(
            resolver.resolve_exhaustive(p(0.0, 0.0)),
            Err(QueryError::Geodesy(GeodesyError::NonConvergent { .. }))
        ));
    }

    #[test]
    fn equal_distances_go_to_the_lowest_segment() {
        // Two mirror-image segments either side of the query
        let (store, index) = build(vec![
            Polyline::new("north", vec![(-1.0, 1.0), (1.0, 1.0)]),
            Polyline::new("south", vec![(-1.0, -1.0), (1.0, -1.0)]),
        ]);
        let resolver = Resolver::new(&store, &index).unwrap();
        let result = resolver.resolve(p(0.0, 0.0)).unwrap();
        assert_eq!(result.segment_id, SegmentId(0));
        assert_eq!(resolver.resolve_exhaustive(p(0.0, 0.0)).unwrap(), result);
    }
}
