//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The query layer calls routing through the [`Router`] trait, so a
//! contraction hierarchy or A* can replace [`DijkstraRouter`] without
//! touching the orchestrator.
//!
//! # Cost
//!
//! The cost of an edge is its stored weight (segment length).  The `speed`
//! attribute is deliberately ignored; routes are shortest, not fastest.
//!
//! # Cancellation
//!
//! [`SearchLimits`] carries an optional deadline and an optional shared
//! cancel flag.  Both are polled every [`CHECK_INTERVAL`] heap pops, so a
//! search over a pathological graph stops promptly without paying for a
//! clock read on every relaxation.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sr_core::{EdgeId, NodeId, SegmentId};

use crate::network::Graph;
use crate::{GraphError, GraphResult};

/// Heap pops between two limit checks.
pub const CHECK_INTERVAL: u32 = 1024;

// ── Limits ────────────────────────────────────────────────────────────────────

/// Shared flag: set to `true` from any thread to abort searches holding it.
pub type CancelFlag = Arc<AtomicBool>;

/// Cooperative stop conditions for a single search.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub deadline: Option<Instant>,
    pub cancel:   Option<CancelFlag>,
}

impl SearchLimits {
    /// No deadline, no cancel flag.
    pub fn none() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { deadline: Some(Instant::now() + timeout), cancel: None }
    }

    pub fn cancel_on(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// `Err` once the flag is set or the deadline has passed.
    pub fn check(&self) -> GraphResult<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(GraphError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(GraphError::TimedOut);
            }
        }
        Ok(())
    }
}

// ── PathResult ────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Nodes visited, from source to target inclusive.
    pub nodes: Vec<NodeId>,
    /// Edges traversed, in order.  `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Source segment of each traversed edge.
    pub segments: Vec<SegmentId>,
    /// Sum of the traversed edges' weights, added in path order.
    pub total_cost: f64,
}

impl PathResult {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
///
/// Implementations must be `Send + Sync`: one instance serves every
/// concurrent query.
pub trait Router: Send + Sync {
    /// Compute a minimum-cost path from `from` to `to`.
    ///
    /// `from == to` yields a trivial path rather than an error.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NodeNotFound`] for an id outside the graph.
    /// - [`GraphError::NoPathFound`] when the nodes are in different
    ///   components.  This is an expected outcome, not a fault.
    /// - [`GraphError::Cancelled`] / [`GraphError::TimedOut`] when `limits`
    ///   trip.
    fn route(
        &self,
        graph: &Graph,
        from: NodeId,
        to: NodeId,
        limits: &SearchLimits,
    ) -> GraphResult<PathResult>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR street graph.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph: &Graph,
        from: NodeId,
        to: NodeId,
        limits: &SearchLimits,
    ) -> GraphResult<PathResult> {
        dijkstra(graph, from, to, limits)
    }
}

/// Shortest path between two nodes with no limits.
pub fn shortest_path(graph: &Graph, from: NodeId, to: NodeId) -> GraphResult<PathResult> {
    dijkstra(graph, from, to, &SearchLimits::none())
}

/// Cost of the shortest path between two nodes with no limits.
pub fn shortest_path_cost(graph: &Graph, from: NodeId, to: NodeId) -> GraphResult<f64> {
    shortest_path(graph, from, to).map(|p| p.total_cost)
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; NodeId breaks cost ties deterministically.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(
    graph: &Graph,
    from: NodeId,
    to: NodeId,
    limits: &SearchLimits,
) -> GraphResult<PathResult> {
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(GraphError::NodeNotFound(node));
        }
    }
    limits.check()?;

    if from == to {
        return Ok(PathResult {
            nodes: vec![from],
            edges: vec![],
            segments: vec![],
            total_cost: 0.0,
        });
    }

    let n = graph.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev_edge[v] = edge that reached v; INVALID for unreached nodes and the source.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, node: from });

    let mut pops: u32 = 0;
    while let Some(HeapEntry { cost, node }) = heap.pop() {
        pops = pops.wrapping_add(1);
        if pops % CHECK_INTERVAL == 0 {
            limits.check()?;
        }

        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (neighbor, edge) in graph.neighbors(node) {
            let new_cost = cost + graph.edges[edge.index()].weight;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(HeapEntry { cost: new_cost, node: neighbor });
            }
        }
    }

    Err(GraphError::NoPathFound { from, to })
}

fn reconstruct(graph: &Graph, prev_edge: &[EdgeId], from: NodeId, to: NodeId) -> PathResult {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeId::INVALID, "settled node without predecessor");
        edges.push(e);
        cur = graph.edges[e.index()].other(cur);
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    let mut segments = Vec::with_capacity(edges.len());
    // Same addition order as the search, so this equals the settled distance.
    let mut total_cost = 0.0;
    let mut at = from;
    for &e in &edges {
        let edge = &graph.edges[e.index()];
        at = edge.other(at);
        nodes.push(at);
        segments.push(edge.segment);
        total_cost += edge.weight;
    }

    PathResult { nodes, edges, segments, total_cost }
}
