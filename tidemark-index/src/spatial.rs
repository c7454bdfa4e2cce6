//! Spatial index for finding coastline segments near a point
//!
//! The tree is an STR bulk-loaded R-tree over segment bounding boxes in
//! `[lon, lat]` space. Queries walk it best-first: a min-heap holds
//! unopened nodes and unreturned leaves keyed by the geodesic lower bound
//! of their box, so leaves come out in non-decreasing bound order and the
//! heap top bounds everything not yet returned.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use rstar::{ParentNode, RTree, RTreeNode, RTreeObject, AABB};
use tracing::debug;

use tidemark_common::GeoPoint;
use tidemark_geometry::BoundingBox;

use crate::store::{SegmentId, SegmentStore};

/// Segment box with its store id for the R-tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedSegment {
    pub id: SegmentId,
    pub bbox: BoundingBox,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let (lower, upper) = self.bbox.corners();
        AABB::from_corners(lower, upper)
    }
}

/// A segment worth examining, with a lower bound on its geodesic distance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub segment: SegmentId,
    pub lower_bound_m: f64,
}

/// Spatial index over coastline segments
pub struct SpatialIndex {
    tree: RTree<IndexedSegment>,
}

impl SpatialIndex {
    /// Build spatial index from the segment store
    pub fn build(store: &SegmentStore) -> Self {
        let leaves: Vec<IndexedSegment> = store
            .iter()
            .map(|(id, segment)| IndexedSegment {
                id,
                bbox: segment.bbox(),
            })
            .collect();

        let tree = RTree::bulk_load(leaves);
        debug!(segments = tree.size(), "spatial index built");

        Self { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Box around every indexed segment
    pub fn bounds(&self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        Some(envelope_box(&self.tree.root().envelope()))
    }

    /// Candidates around `point`, nearest lower bound first.
    ///
    /// The sequence is lazy: nodes are only opened when the consumer asks
    /// for more, so stopping early skips the rest of the tree.
    pub fn candidates(&self, point: GeoPoint) -> Candidates<'_> {
        let mut heap = BinaryHeap::new();
        if !self.is_empty() {
            let root = self.tree.root();
            heap.push(Entry {
                bound_m: envelope_box(&root.envelope()).lower_bound_m(point),
                item: Item::Node(root),
            });
        }

        Candidates {
            origin: point,
            heap,
            max_bound_m: f64::INFINITY,
            nodes_opened: 0,
        }
    }
}

fn envelope_box(envelope: &AABB<[f64; 2]>) -> BoundingBox {
    BoundingBox::from_corners(envelope.lower(), envelope.upper())
}

enum Item<'a> {
    Node(&'a ParentNode<IndexedSegment>),
    Leaf(&'a IndexedSegment),
}

struct Entry<'a> {
    bound_m: f64,
    item: Item<'a>,
}

impl Entry<'_> {
    /// Among equal bounds, leaves pop before nodes and lower ids first
    fn tie_key(&self) -> (u8, u32) {
        match self.item {
            Item::Leaf(leaf) => (0, leaf.id.0),
            Item::Node(_) => (1, 0),
        }
    }
}

impl PartialEq for Entry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry<'_> {}

impl PartialOrd for Entry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: reverse ordering
        other
            .bound_m
            .total_cmp(&self.bound_m)
            .then_with(|| other.tie_key().cmp(&self.tie_key()))
    }
}

/// Lazy, finite, non-restartable candidate sequence from
/// [`SpatialIndex::candidates`].
pub struct Candidates<'a> {
    origin: GeoPoint,
    heap: BinaryHeap<Entry<'a>>,
    max_bound_m: f64,
    nodes_opened: usize,
}

impl<'a> Candidates<'a> {
    /// End the sequence once the lower bound passes `radius_m`.
    pub fn within(mut self, radius_m: f64) -> Self {
        self.max_bound_m = radius_m;
        self
    }

    /// Lower bound shared by every candidate not yet returned, `None` when
    /// the sequence is over.
    pub fn next_bound(&self) -> Option<f64> {
        self.heap
            .peek()
            .map(|entry| entry.bound_m)
            .filter(|&bound| bound <= self.max_bound_m)
    }

    /// Internal tree nodes opened so far
    pub fn nodes_opened(&self) -> usize {
        self.nodes_opened
    }

    fn open(&mut self, node: &'a ParentNode<IndexedSegment>) {
        self.nodes_opened += 1;
        for child in node.children() {
            let entry = match child {
                RTreeNode::Leaf(leaf) => Entry {
                    bound_m: leaf.bbox.lower_bound_m(self.origin),
                    item: Item::Leaf(leaf),
                },
                RTreeNode::Parent(parent) => Entry {
                    bound_m: envelope_box(&parent.envelope()).lower_bound_m(self.origin),
                    item: Item::Node(parent),
                },
            };
            self.heap.push(entry);
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        loop {
            if self.next_bound().is_none() {
                self.heap.clear();
                return None;
            }
            let entry = self.heap.pop()?;
            match entry.item {
                Item::Leaf(leaf) => {
                    return Some(Candidate {
                        segment: leaf.id,
                        lower_bound_m: entry.bound_m,
                    })
                }
                Item::Node(node) => self.open(node),
            }
        }
    }
}

impl FusedIterator for Candidates<'_> {}
