//! The operations exposed to a transport layer.
//!
//! [`RouteService`] owns the shared snapshot, the projection and the router,
//! and turns internal results into plain serialisable responses with
//! geodetic coordinates.  Every method takes `&self` and grabs the current
//! snapshot once, so a concurrent [`SharedSnapshot::replace`] never mixes
//! old and new data within one answer.

use std::sync::Arc;
use std::time::Duration;

use geo::{Coord, LineString};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use log::{debug, warn};
use serde::Serialize;
use serde_json::json;

use sr_address::AddressRecord;
use sr_core::{GeoPoint, PlanarPoint, Projection};
use sr_graph::{DijkstraRouter, GraphError, Router, SearchLimits};

use crate::config::ServiceConfig;
use crate::orchestrator::{self, RoutePlan};
use crate::snapshot::{RoutingSnapshot, SharedSnapshot};
use crate::{QueryError, QueryResult};

// ── Responses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub lat:  f64,
    pub lon:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMatch {
    pub node:     u32,
    /// Planar position of the node.
    pub x:        f64,
    pub y:        f64,
    /// Planar distance from the query point, metres.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: u32,
    pub x:  f64,
    pub y:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub start:         Location,
    pub end:           Location,
    pub segment_ids:   Vec<u64>,
    /// One `LineString` feature per traversed segment, `[lon, lat]`
    /// positions, with a `segmentId` property.
    pub geometry:      FeatureCollection,
    pub total_cost:    f64,
    pub node_sequence: Vec<NodeView>,
}

// ── RouteService ──────────────────────────────────────────────────────────────

/// Query front end over a swappable [`RoutingSnapshot`].
///
/// # Type parameters
///
/// - `P`: coordinate projection used at the boundary.
/// - `R`: shortest-path engine; defaults to [`DijkstraRouter`].
pub struct RouteService<P: Projection, R: Router = DijkstraRouter> {
    snapshots:  Arc<SharedSnapshot>,
    projection: P,
    router:     R,
    config:     ServiceConfig,
}

impl<P: Projection> RouteService<P, DijkstraRouter> {
    pub fn new(snapshot: RoutingSnapshot, projection: P, config: ServiceConfig) -> Self {
        Self::with_router(Arc::new(SharedSnapshot::new(snapshot)), projection, DijkstraRouter, config)
    }
}

impl<P: Projection, R: Router> RouteService<P, R> {
    pub fn with_router(
        snapshots:  Arc<SharedSnapshot>,
        projection: P,
        router:     R,
        config:     ServiceConfig,
    ) -> Self {
        Self { snapshots, projection, router, config }
    }

    /// Handle for swapping in rebuilt data.
    pub fn snapshots(&self) -> &Arc<SharedSnapshot> {
        &self.snapshots
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn limits(&self) -> SearchLimits {
        match self.config.route_timeout_ms {
            Some(ms) => SearchLimits::with_timeout(Duration::from_millis(ms)),
            None => SearchLimits::none(),
        }
    }

    fn to_location(&self, name: &str, point: PlanarPoint) -> Location {
        let geo = self.projection.to_geodetic(point);
        Location { name: name.to_owned(), lat: geo.lat, lon: geo.lon }
    }

    /// Address labels for type-ahead.
    ///
    /// Prefix matches (narrowed by `AddressIndex::contains_limited`) come
    /// first.  When no name starts with the text, a case-insensitive
    /// `AddressIndex::substring_search` is offered instead.  Short input
    /// yields an empty list.
    pub fn suggest(&self, text: &str) -> Vec<Suggestion> {
        let snapshot = self.snapshots.current();
        let limit = self.config.suggest_limit;
        let hits: Vec<&AddressRecord> = match snapshot.addresses.contains_limited(text, limit) {
            Ok(hits) if !hits.is_empty() => hits,
            Ok(_) => snapshot.addresses.substring_search(text, limit).unwrap_or_default(),
            Err(e) => {
                debug!("suggest: {e}");
                Vec::new()
            }
        };
        hits.into_iter().map(|r| Suggestion { label: r.name.clone() }).collect()
    }

    /// Every prefix match with its geodetic position.  Short input yields an
    /// empty list.
    pub fn location(&self, text: &str) -> Vec<Location> {
        let snapshot = self.snapshots.current();
        match snapshot.addresses.search(text) {
            Ok(hits) => hits.into_iter().map(|r| self.to_location(&r.name, r.point)).collect(),
            Err(e) => {
                debug!("location: {e}");
                Vec::new()
            }
        }
    }

    /// Nearest graph node to a position in the projection's input space
    /// (degrees, or planar units under `Identity`).
    pub fn find_node(&self, lat: f64, lon: f64) -> QueryResult<NodeMatch> {
        let geo = GeoPoint::new(lon, lat);
        self.projection
            .validate_input(geo)
            .map_err(|e| QueryError::InvalidCoordinate(e.to_string()))?;
        let point = self.projection.to_planar(geo);
        let snapshot = self.snapshots.current();
        let (node, distance) = snapshot.spatial.nearest(point).map_err(|e| match e {
            GraphError::EmptyIndex => QueryError::EmptyNetwork,
            other => QueryError::Graph(other),
        })?;
        let pos = snapshot.graph.node_pos[node.index()];
        Ok(NodeMatch { node: node.0, x: pos.x, y: pos.y, distance })
    }

    /// Route between two free-text places, with display geometry.
    pub fn find_route(&self, start: &str, end: &str) -> QueryResult<RouteResponse> {
        let snapshot = self.snapshots.current();
        let plan = orchestrator::route(&snapshot, &self.router, start, end, &self.limits())?;
        self.render(&snapshot, plan)
    }

    /// Route many pairs; each result is independent.
    pub fn route_batch(&self, pairs: &[(String, String)]) -> Vec<QueryResult<RouteResponse>> {
        let snapshot = self.snapshots.current();
        let one = |(start, end): &(String, String)| {
            orchestrator::route(&snapshot, &self.router, start, end, &self.limits())
                .and_then(|plan| self.render(&snapshot, plan))
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            pairs.par_iter().map(one).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            pairs.iter().map(one).collect()
        }
    }

    fn render(&self, snapshot: &RoutingSnapshot, plan: RoutePlan) -> QueryResult<RouteResponse> {
        let graph = &snapshot.graph;
        let path = &plan.path;

        let features = path
            .edges
            .iter()
            .enumerate()
            .map(|(idx, &e)| {
                let edge = graph.edge(e);
                let vertices = match snapshot.segments.get(edge.segment) {
                    Some(v) => v.to_vec(),
                    None => {
                        warn!("no geometry for {}; using its endpoints", edge.segment);
                        vec![graph.node_pos[edge.a.index()], graph.node_pos[edge.b.index()]]
                    }
                };
                let coords: Vec<Coord<f64>> = vertices
                    .into_iter()
                    .map(|p| {
                        let g = self.projection.to_geodetic(p);
                        Coord { x: g.lon, y: g.lat }
                    })
                    .collect();
                let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));

                let value = json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "segmentId": edge.segment.0,
                        "index": idx,
                        "length": edge.weight,
                    }
                });
                Feature::from_json_value(value).map_err(|e| QueryError::Geometry(e.to_string()))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        let node_sequence = path
            .nodes
            .iter()
            .map(|&n| {
                let p = graph.node_pos[n.index()];
                NodeView { id: n.0, x: p.x, y: p.y }
            })
            .collect();

        Ok(RouteResponse {
            start: self.to_location(&plan.start.address.name, plan.start.address.point),
            end: self.to_location(&plan.end.address.name, plan.end.address.point),
            segment_ids: path.segments.iter().map(|s| s.0).collect(),
            geometry: FeatureCollection { features, bbox: None, foreign_members: None },
            total_cost: path.total_cost,
            node_sequence,
        })
    }
}
