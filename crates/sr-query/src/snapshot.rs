//! Immutable routing data and its atomically swappable holder.
//!
//! # Lifecycle
//!
//! 1. [`SnapshotBuilder`] loads segments and addresses, builds the graph,
//!    the spatial index over its nodes, and the address index.  This runs
//!    once, single-threaded.
//! 2. The resulting [`RoutingSnapshot`] is never mutated.  Queries borrow it
//!    through an `Arc` and need no locking.
//! 3. Replacing the network means building a new snapshot off to the side
//!    and calling [`SharedSnapshot::replace`].  Queries already holding the
//!    old `Arc` finish against the old data.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use sr_address::{load_addresses_csv, AddressIndex, AddressRecord};
use sr_core::Projection;
use sr_graph::{build_graph, load_segments_csv, Graph, Segment, SegmentCatalog, SpatialIndex};

use crate::config::ServiceConfig;
use crate::{QueryError, QueryResult};

// ── RoutingSnapshot ───────────────────────────────────────────────────────────

/// Everything a query reads, built together so the pieces always agree.
pub struct RoutingSnapshot {
    pub graph:     Graph,
    pub spatial:   SpatialIndex,
    pub addresses: AddressIndex,
    /// Full segment polylines for route display.  Not used for routing.
    pub segments:  SegmentCatalog,
}

impl RoutingSnapshot {
    /// Bundle a graph and address index, deriving the spatial index from the
    /// graph so the two can never drift apart.
    pub fn new(graph: Graph, addresses: AddressIndex, segments: SegmentCatalog) -> Self {
        let spatial = SpatialIndex::from_graph(&graph);
        Self { graph, spatial, addresses, segments }
    }
}

// ── SnapshotBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`RoutingSnapshot`].
///
/// # Required inputs
///
/// | Method           | Source                                          |
/// |------------------|-------------------------------------------------|
/// | `.segments(v)`   | `sr_graph::load_segments_*` or hand-built       |
/// | `.addresses(v)`  | `sr_address::load_addresses_*` or hand-built    |
///
/// # Example
///
/// ```rust,ignore
/// let snapshot = SnapshotBuilder::new()
///     .segments(load_segments_csv(&streets)?)
///     .addresses(load_addresses_csv(&addresses, &projection)?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct SnapshotBuilder {
    segments:  Option<Vec<Segment>>,
    addresses: Option<Vec<AddressRecord>>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load both inputs from the paths in `config`, projecting addresses with
    /// `projection`.
    pub fn from_config<P>(config: &ServiceConfig, projection: &P) -> QueryResult<Self>
    where
        P: Projection + ?Sized,
    {
        let segments_path = ServiceConfig::required_path(&config.segments_path, "segments_path")?;
        let addresses_path =
            ServiceConfig::required_path(&config.addresses_path, "addresses_path")?;
        Self::from_paths(segments_path, addresses_path, projection)
    }

    pub fn from_paths<P>(segments: &Path, addresses: &Path, projection: &P) -> QueryResult<Self>
    where
        P: Projection + ?Sized,
    {
        let segments = load_segments_csv(segments)?;
        let addresses = load_addresses_csv(addresses, projection)?;
        Ok(Self::new().segments(segments).addresses(addresses))
    }

    pub fn segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn addresses(mut self, addresses: Vec<AddressRecord>) -> Self {
        self.addresses = Some(addresses);
        self
    }

    /// Validate inputs and build every structure.
    ///
    /// # Errors
    ///
    /// `Config` if an input was never supplied; the wrapped graph/address
    /// error if either would end up empty.
    pub fn build(self) -> QueryResult<RoutingSnapshot> {
        let segments = self
            .segments
            .ok_or_else(|| QueryError::Config("no street segments supplied".into()))?;
        let addresses = self
            .addresses
            .ok_or_else(|| QueryError::Config("no addresses supplied".into()))?;

        let graph = build_graph(&segments)?;
        let catalog = SegmentCatalog::from_segments(&segments);
        drop(segments);

        let addresses = AddressIndex::build(addresses)?;
        info!("built address index: {} records", addresses.len());

        Ok(RoutingSnapshot::new(graph, addresses, catalog))
    }
}

// ── SharedSnapshot ────────────────────────────────────────────────────────────

/// Process-wide handle to the current snapshot.
///
/// The lock only guards the `Arc` pointer itself: readers hold it for one
/// clone, writers for one pointer swap.  No query runs under it.
pub struct SharedSnapshot {
    current: RwLock<Arc<RoutingSnapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: RoutingSnapshot) -> Self {
        Self { current: RwLock::new(Arc::new(snapshot)) }
    }

    /// The snapshot queries should use right now.
    pub fn current(&self) -> Arc<RoutingSnapshot> {
        // A poisoned lock still holds a valid Arc; nothing is half-written.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in `next` and return the previous snapshot.
    pub fn replace(&self, next: RoutingSnapshot) -> Arc<RoutingSnapshot> {
        info!(
            "replacing routing snapshot: {} nodes, {} edges, {} addresses",
            next.graph.node_count(),
            next.graph.edge_count(),
            next.addresses.len()
        );
        let next = Arc::new(next);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
