//! Nearest-node lookup over the graph's node positions.
//!
//! An R-tree (via `rstar`) bulk-loaded from planar coordinates answers
//! nearest-neighbour queries in expected O(log n).  Query points must already
//! be in the graph's planar system; reproject geodetic input first.
//!
//! The index is derived data: it is built once from a [`Graph`] and must be
//! rebuilt whenever the graph is.
//!
//! # Ties
//!
//! When several nodes are equidistant from the query, the one returned is
//! whichever the R-tree traversal reaches first.  That choice is stable for
//! a given build but carries no meaning.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sr_core::{NodeId, PlanarPoint};

use crate::network::Graph;
use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [x, y]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared planar Euclidean distance.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Read-only nearest-node index.
pub struct SpatialIndex {
    tree: RTree<NodeEntry>,
}

impl SpatialIndex {
    /// Bulk-load from `(NodeId, position)` pairs.
    ///
    /// O(N log N); faster than N individual inserts.
    pub fn build<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, PlanarPoint)>,
    {
        let entries: Vec<NodeEntry> = nodes
            .into_iter()
            .map(|(id, p)| NodeEntry { point: [p.x, p.y], id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Index every node of `graph`.
    pub fn from_graph(graph: &Graph) -> Self {
        Self::build(
            graph
                .node_pos
                .iter()
                .enumerate()
                .map(|(i, &p)| (NodeId(i as u32), p)),
        )
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The node nearest to `point` and its Euclidean distance.
    ///
    /// # Errors
    ///
    /// [`GraphError::EmptyIndex`] if the index holds no nodes.
    pub fn nearest(&self, point: PlanarPoint) -> GraphResult<(NodeId, f64)> {
        let query = [point.x, point.y];
        self.tree
            .nearest_neighbor(&query)
            .map(|e| (e.id, e.distance_2(&query).sqrt()))
            .ok_or(GraphError::EmptyIndex)
    }

    /// Up to `k` nearest nodes to `point`, sorted by ascending distance.
    pub fn k_nearest(&self, point: PlanarPoint, k: usize) -> Vec<(NodeId, f64)> {
        let query = [point.x, point.y];
        self.tree
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|e| (e.id, e.distance_2(&query).sqrt()))
            .collect()
    }
}
