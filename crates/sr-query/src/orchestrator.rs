//! Address-to-address routing.
//!
//! A route request runs four steps, and any failure stops it with a single
//! error naming the step and side:
//!
//! | Step               | Failure                                        |
//! |--------------------|------------------------------------------------|
//! | query length check | `InvalidQuery { side }`                        |
//! | address prefix     | `AddressNotFound { side, query }`              |
//! | nearest node       | `NodeNotFound { side }`                        |
//! | shortest path      | `NoPathFound`, `Cancelled`, `TimedOut`         |
//!
//! The first address match is canonical, so among equally-prefixed names the
//! one appearing first in the source file wins.

use log::debug;

use sr_address::{AddressError, AddressRecord};
use sr_core::NodeId;
use sr_graph::{GraphError, PathResult, Router, SearchLimits};

use crate::error::Side;
use crate::snapshot::RoutingSnapshot;
use crate::{QueryError, QueryResult};

/// One end of a route after address and node resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEndpoint {
    pub address: AddressRecord,
    pub node: NodeId,
    /// Planar distance from the address to `node`.
    pub snap_distance: f64,
}

/// A complete answer to a route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub start: ResolvedEndpoint,
    pub end: ResolvedEndpoint,
    pub path: PathResult,
}

/// Route between two free-text places.
pub fn route<R>(
    snapshot: &RoutingSnapshot,
    router: &R,
    start: &str,
    end: &str,
    limits: &SearchLimits,
) -> QueryResult<RoutePlan>
where
    R: Router + ?Sized,
{
    let start_address = resolve_address(snapshot, Side::Start, start)?;
    let end_address = resolve_address(snapshot, Side::End, end)?;

    let start = snap(snapshot, Side::Start, start_address)?;
    let end = snap(snapshot, Side::End, end_address)?;

    let path = router
        .route(&snapshot.graph, start.node, end.node, limits)
        .map_err(|e| match e {
            GraphError::NoPathFound { from, to } => QueryError::NoPathFound { from, to },
            GraphError::Cancelled => QueryError::Cancelled,
            GraphError::TimedOut => QueryError::TimedOut,
            other => QueryError::Graph(other),
        })?;

    debug!(
        "route {:?} -> {:?}: {} edges, cost {}",
        start.address.name,
        end.address.name,
        path.edges.len(),
        path.total_cost
    );
    Ok(RoutePlan { start, end, path })
}

fn resolve_address(
    snapshot: &RoutingSnapshot,
    side: Side,
    query: &str,
) -> QueryResult<AddressRecord> {
    match snapshot.addresses.first_match(query) {
        Ok(Some(record)) => {
            debug!("{side} query {query:?} resolved to {:?}", record.name);
            Ok(record.clone())
        }
        Ok(None) => Err(QueryError::AddressNotFound { side, query: query.to_owned() }),
        Err(AddressError::EmptyQuery(_)) => {
            Err(QueryError::InvalidQuery { side, query: query.to_owned() })
        }
        Err(other) => Err(QueryError::Address(other)),
    }
}

fn snap(
    snapshot: &RoutingSnapshot,
    side: Side,
    address: AddressRecord,
) -> QueryResult<ResolvedEndpoint> {
    let (node, snap_distance) = snapshot
        .spatial
        .nearest(address.point)
        .map_err(|_| QueryError::NodeNotFound { side })?;
    debug!("{side} address snapped to {node} ({snap_distance:.1} m away)");
    Ok(ResolvedEndpoint { address, node, snap_distance })
}
