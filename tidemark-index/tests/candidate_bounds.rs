use tidemark_geometry::{geodesy, project_onto_segment};
use tidemark_index::{SegmentStore, SpatialIndex};
use tidemark_test::{random_points, random_walk_coastline, seeded, Region};

#[test]
fn candidate_bound_is_below_every_point_of_the_segment() {
    let lines = random_walk_coastline(&mut seeded(77), Region::GLOBAL, 60, 40, 0.5);
    let store = SegmentStore::build(lines);
    let index = SpatialIndex::build(&store);

    for q in random_points(&mut seeded(78), Region::GLOBAL, 25) {
        for candidate in index.candidates(q).take(200) {
            let segment = store[candidate.segment];
            let foot = project_onto_segment(q, segment.start, segment.end).point;

            for target in [segment.start, segment.end, foot] {
                let Ok(d) = geodesy::distance_m(q, target) else {
                    continue;
                };
                assert!(
                    candidate.lower_bound_m <= d,
                    "bound {} > distance {d} from {q} to {target}",
                    candidate.lower_bound_m
                );
            }
        }
    }
}

#[test]
fn rebuilding_gives_the_same_candidate_order() {
    let lines = random_walk_coastline(&mut seeded(5), Region::NORTH_SEA, 20, 30, 0.2);
    let first = SpatialIndex::build(&SegmentStore::build(lines.clone()));
    let second = SpatialIndex::build(&SegmentStore::build(lines));

    for q in random_points(&mut seeded(6), Region::NORTH_SEA, 10) {
        let a: Vec<_> = first.candidates(q).take(50).collect();
        let b: Vec<_> = second.candidates(q).take(50).collect();
        assert_eq!(a, b);
    }
}
