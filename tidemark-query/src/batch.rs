//! Batch query coordinator
//!
//! One slot per input point, in input order. A failing point only fills
//! its own slot.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use tidemark_common::GeoPoint;

use crate::error::QueryError;
use crate::resolver::{QueryResult, Resolver};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Position of the point in the request
    pub index: usize,
    pub result: Result<QueryResult, QueryError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Resolve every point, optionally across the rayon pool.
pub fn resolve_batch(
    resolver: &Resolver<'_>,
    points: &[GeoPoint],
    parallel: bool,
) -> Vec<BatchItem> {
    let start = Instant::now();

    let resolve = |(index, point): (usize, &GeoPoint)| BatchItem {
        index,
        result: resolver.resolve(*point),
    };

    let items: Vec<BatchItem> = if parallel {
        points.par_iter().enumerate().map(resolve).collect()
    } else {
        points.iter().enumerate().map(resolve).collect()
    };

    let failed = items.iter().filter(|item| !item.is_ok()).count();
    debug!(
        points = points.len(),
        failed,
        parallel,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "batch resolved"
    );

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark_common::Polyline;
    use tidemark_index::{SegmentStore, SpatialIndex};

    #[test]
    fn keeps_input_order_and_isolates_failures() {
        let store = SegmentStore::build(vec![Polyline::new(
            "shore",
            vec![(0.0, 0.0), (0.0, 10.0)],
        )]);
        let index = SpatialIndex::build(&store);
        let resolver = Resolver::new(&store, &index).unwrap();

        let points = vec![
            GeoPoint {
                latitude: 1.0,
                longitude: 1.0,
            },
            GeoPoint {
                latitude: f64::NAN,
                longitude: 1.0,
            },
            GeoPoint {
                latitude: 2.0,
                longitude: 1.0,
            },
        ];

        for parallel in [false, true] {
            let items = resolve_batch(&resolver, &points, parallel);
            assert_eq!(items.len(), 3);
            assert_eq!(
                items.iter().map(|i| i.index).collect::<Vec<_>>(),
                vec![0, 1, 2]
            );
            assert!(items[0].is_ok());
            assert!(matches!(items[1].result, Err(QueryError::Input(_))));
            assert!(items[2].is_ok());
            assert_eq!(items[2].result.as_ref().unwrap().query.latitude, 2.0);
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        let store = SegmentStore::build(vec![Polyline::new("s", vec![(0.0, 0.0), (1.0, 0.0)])]);
        let index = SpatialIndex::build(&store);
        let resolver = Resolver::new(&store, &index).unwrap();
        assert!(resolve_batch(&resolver, &[], true).is_empty());
    }
}
