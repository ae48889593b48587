//! Street graph representation and builder.
//!
//! # Data layout
//!
//! Edges are **undirected** and stored once in `edges`, indexed by `EdgeId`.
//! Adjacency uses **Compressed Sparse Row (CSR)** format: the incident
//! entries of `NodeId n` occupy
//!
//! ```text
//! adj_node[ adj_start[n] .. adj_start[n+1] ]   // neighbour
//! adj_edge[ adj_start[n] .. adj_start[n+1] ]   // edge reaching it
//! ```
//!
//! Every edge contributes one entry to each endpoint, so both directions
//! share a single weight.  A self-loop contributes two entries to its node.
//!
//! # Node identity
//!
//! A node *is* its planar coordinate.  Two segment endpoints connect only if
//! their `f64` coordinates are bit-for-bit equal (`-0.0` is folded into
//! `0.0`).  Source layers whose intersections are digitised with small gaps
//! will therefore produce disconnected components; no snapping tolerance is
//! applied.
//!
//! # Duplicate segments
//!
//! The graph keeps at most one edge per unordered node pair.  When a later
//! segment joins two nodes that are already joined, it **replaces** the
//! earlier edge's weight, segment id and speed (last write wins).  The
//! `EdgeId` stays the same.

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use sr_core::{EdgeId, NodeId, PlanarPoint, SegmentId};

use crate::{GraphError, GraphResult};

// ── Source segment ────────────────────────────────────────────────────────────

/// One polyline from the street layer, as handed over by the loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    /// Polyline vertices in planar coordinates.  Only the first and last
    /// become graph nodes.
    pub vertices: Vec<PlanarPoint>,
    /// Explicit length attribute.  When `None` the polyline length is used.
    pub length: Option<f64>,
    /// Posted speed.  Carried on the edge; not part of the cost.
    pub speed: Option<f64>,
}

impl Segment {
    pub fn new(id: SegmentId, vertices: Vec<PlanarPoint>) -> Self {
        Self { id, vertices, length: None, speed: None }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Sum of the Euclidean lengths of consecutive vertex pairs.
    pub fn polyline_length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    /// Edge weight for this segment: the explicit length if present,
    /// otherwise the polyline length.
    pub fn weight(&self) -> f64 {
        self.length.unwrap_or_else(|| self.polyline_length())
    }

    fn endpoints(&self) -> GraphResult<(PlanarPoint, PlanarPoint)> {
        let (Some(&first), Some(&last)) = (self.vertices.first(), self.vertices.last()) else {
            return Err(self.degenerate("no vertices"));
        };
        if self.vertices.len() < 2 {
            return Err(self.degenerate("fewer than two vertices"));
        }
        if !self.vertices.iter().all(|v| v.is_finite()) {
            return Err(self.degenerate("non-finite vertex"));
        }
        Ok((first, last))
    }

    fn degenerate(&self, reason: &str) -> GraphError {
        GraphError::DegenerateSegment { segment: self.id, reason: reason.to_owned() }
    }
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// Undirected edge between two nodes, derived from one source segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Non-negative traversal cost (segment length), identical both ways.
    pub weight: f64,
    pub segment: SegmentId,
    pub speed: Option<f64>,
}

impl Edge {
    /// The endpoint opposite `node`.  For a self-loop this is `node` itself.
    #[inline]
    pub fn other(&self, node: NodeId) -> NodeId {
        if node == self.a { self.b } else { self.a }
    }
}

// ── Coordinate key ────────────────────────────────────────────────────────────

type CoordKey = (u64, u64);

#[inline]
fn coord_key(p: PlanarPoint) -> CoordKey {
    // `+ 0.0` turns -0.0 into 0.0 so both signs share one node.
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Undirected street graph in CSR format.
///
/// All fields except the coordinate lookup are `pub` for direct indexed
/// access in the router.  Do not construct directly; use [`GraphBuilder`] or
/// [`build_graph`].
pub struct Graph {
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<PlanarPoint>,

    /// Undirected edges.  Indexed by `EdgeId`.
    pub edges: Vec<Edge>,

    /// CSR row pointer.  Incident entries of node `n` are at
    /// `adj_start[n] .. adj_start[n+1]`.  Length = `node_count + 1`.
    pub adj_start: Vec<u32>,

    /// Neighbour reached by each adjacency entry.
    pub adj_node: Vec<NodeId>,

    /// Edge used by each adjacency entry.
    pub adj_edge: Vec<EdgeId>,

    node_index: FxHashMap<CoordKey, NodeId>,
}

impl Graph {
    /// A graph with no nodes or edges.
    pub fn empty() -> Self {
        GraphBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    /// Position of `node`, or `None` for an id outside the arena.
    pub fn position(&self, node: NodeId) -> Option<PlanarPoint> {
        self.node_pos.get(node.index()).copied()
    }

    /// The node sitting exactly on `point`, if any.
    pub fn node_at(&self, point: PlanarPoint) -> Option<NodeId> {
        self.node_index.get(&coord_key(point)).copied()
    }

    /// The edge record for `edge`.
    ///
    /// # Panics
    ///
    /// If `edge` is not an id of this graph.  Ids from a [`PathResult`] or
    /// [`neighbors`](Self::neighbors) of the same graph are always valid.
    ///
    /// [`PathResult`]: crate::PathResult
    #[inline]
    pub fn edge(&self, edge: EdgeId) -> &Edge {
        &self.edges[edge.index()]
    }

    /// `(neighbour, edge)` pairs incident to `node`, in insertion order.
    ///
    /// A contiguous slice scan, no allocation.
    ///
    /// # Panics
    ///
    /// If `node` is outside the arena; check with [`contains`](Self::contains)
    /// first when the id comes from outside.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        let start = self.adj_start[node.index()] as usize;
        let end   = self.adj_start[node.index() + 1] as usize;
        self.adj_node[start..end]
            .iter()
            .copied()
            .zip(self.adj_edge[start..end].iter().copied())
    }

    /// Number of incident adjacency entries (a self-loop counts twice).
    ///
    /// # Panics
    ///
    /// If `node` is outside the arena.
    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.adj_start[node.index()] as usize;
        let end   = self.adj_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge joining `a` and `b`, in either direction.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        self.neighbors(a).find(|&(n, _)| n == b).map(|(_, e)| e)
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Graph`] segment by segment, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sr_core::{PlanarPoint, SegmentId};
/// use sr_graph::{GraphBuilder, Segment};
///
/// let mut b = GraphBuilder::new();
/// b.add_segment(&Segment::new(
///     SegmentId(1),
///     vec![PlanarPoint::new(0.0, 0.0), PlanarPoint::new(3.0, 4.0)],
/// ))
/// .unwrap();
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edges[0].weight, 5.0);
/// ```
pub struct GraphBuilder {
    nodes:      Vec<PlanarPoint>,
    node_index: FxHashMap<CoordKey, NodeId>,
    edges:      Vec<Edge>,
    pair_index: FxHashMap<(NodeId, NodeId), EdgeId>,
    replaced:   usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate for roughly `segments` input segments.
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            nodes:      Vec::with_capacity(segments),
            node_index: FxHashMap::with_capacity_and_hasher(segments, Default::default()),
            edges:      Vec::with_capacity(segments),
            pair_index: FxHashMap::with_capacity_and_hasher(segments, Default::default()),
            replaced:   0,
        }
    }

    /// Look up the node at `point`, creating it if the coordinate is new.
    pub fn node_for(&mut self, point: PlanarPoint) -> NodeId {
        let next = NodeId(self.nodes.len() as u32);
        let id = *self.node_index.entry(coord_key(point)).or_insert(next);
        if id == next {
            self.nodes.push(point);
        }
        id
    }

    /// Insert the edge for one segment.
    ///
    /// Returns the `EdgeId` now carrying this segment.  If the node pair was
    /// already joined, that edge is overwritten and its id returned.
    ///
    /// # Errors
    ///
    /// [`GraphError::DegenerateSegment`] for fewer than two vertices or a
    /// non-finite vertex, [`GraphError::InvalidLength`] for a negative or
    /// non-finite weight.  The builder is unchanged on error.
    pub fn add_segment(&mut self, segment: &Segment) -> GraphResult<EdgeId> {
        let (first, last) = segment.endpoints()?;
        let weight = segment.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidLength { segment: segment.id, length: weight });
        }

        let a = self.node_for(first);
        let b = self.node_for(last);
        let pair = if a <= b { (a, b) } else { (b, a) };

        let edge = Edge { a, b, weight, segment: segment.id, speed: segment.speed };

        if let Some(&existing) = self.pair_index.get(&pair) {
            let old = &mut self.edges[existing.index()];
            debug!(
                "segment {} replaces segment {} between {} and {} (weight {} -> {})",
                segment.id, old.segment, pair.0, pair.1, old.weight, weight
            );
            *old = edge;
            self.replaced += 1;
            return Ok(existing);
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(edge);
        self.pair_index.insert(pair, id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Number of segments that overwrote an existing edge.
    pub fn replaced_count(&self) -> usize { self.replaced }

    /// Consume the builder and produce a [`Graph`].
    ///
    /// Time complexity: O(N + E).
    pub fn build(self) -> Graph {
        let node_count = self.nodes.len();

        // Count incident entries per node.
        let mut adj_start = vec![0u32; node_count + 1];
        for e in &self.edges {
            adj_start[e.a.index() + 1] += 1;
            adj_start[e.b.index() + 1] += 1;
        }
        for i in 1..=node_count {
            adj_start[i] += adj_start[i - 1];
        }
        let entries = adj_start[node_count] as usize;
        debug_assert_eq!(entries, self.edges.len() * 2);

        // Fill in edge order so each node's entries keep insertion order.
        let mut cursor: Vec<u32> = adj_start[..node_count].to_vec();
        let mut adj_node = vec![NodeId::INVALID; entries];
        let mut adj_edge = vec![EdgeId::INVALID; entries];
        for (i, e) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            for (from, to) in [(e.a, e.b), (e.b, e.a)] {
                let slot = cursor[from.index()] as usize;
                adj_node[slot] = to;
                adj_edge[slot] = id;
                cursor[from.index()] += 1;
            }
        }

        Graph {
            node_pos: self.nodes,
            edges: self.edges,
            adj_start,
            adj_node,
            adj_edge,
            node_index: self.node_index,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bulk build ────────────────────────────────────────────────────────────────

/// Build a graph from a whole source layer.
///
/// Unusable segments are logged at `warn` and skipped.  The build only fails
/// when nothing usable is left.
///
/// # Errors
///
/// [`GraphError::EmptyGraph`] if no segment produced an edge.
pub fn build_graph<'a, I>(segments: I) -> GraphResult<Graph>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let iter = segments.into_iter();
    let mut builder = GraphBuilder::with_capacity(iter.size_hint().0);
    let mut skipped = 0usize;

    for segment in iter {
        if let Err(e) = builder.add_segment(segment) {
            warn!("skipping segment: {e}");
            skipped += 1;
        }
    }

    if builder.edge_count() == 0 {
        return Err(GraphError::EmptyGraph { skipped });
    }

    let replaced = builder.replaced_count();
    let graph = builder.build();
    info!(
        "built street graph: {} nodes, {} edges ({} skipped, {} replaced)",
        graph.node_count(),
        graph.edge_count(),
        skipped,
        replaced
    );
    Ok(graph)
}
