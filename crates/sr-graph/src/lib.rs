//! `sr-graph` — street graph, nearest-node index, and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `Graph` (CSR adjacency), `GraphBuilder`, `Segment`, `build_graph` |
//! | [`spatial`] | `SpatialIndex` (R-tree over node positions)                  |
//! | [`router`]  | `Router` trait, `DijkstraRouter`, `PathResult`, `SearchLimits` |
//! | [`loader`]  | `load_segments_csv`, `load_segments_reader`, `SegmentCatalog` |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                               |
//!
//! # Topology
//!
//! Only the first and last vertex of each source polyline become nodes, so
//! the graph size follows the number of intersections rather than geometry
//! density.  Endpoints connect only when their coordinates are **bit-for-bit
//! equal**; there is no snapping tolerance (see [`network`]).
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `sr-core` types.        |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;
pub mod spatial;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use loader::{load_segments_csv, load_segments_reader, SegmentCatalog};
pub use network::{build_graph, Edge, Graph, GraphBuilder, Segment};
pub use router::{
    shortest_path, shortest_path_cost, CancelFlag, DijkstraRouter, PathResult, Router,
    SearchLimits,
};
pub use spatial::SpatialIndex;
