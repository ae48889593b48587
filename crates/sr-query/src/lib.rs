//! `sr-query` — address-to-address routing and the external query surface.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`snapshot`]     | `RoutingSnapshot`, `SnapshotBuilder`, `SharedSnapshot`   |
//! | [`orchestrator`] | `route` (resolve → snap → search), `RoutePlan`           |
//! | [`service`]      | `RouteService`: `suggest`, `location`, `find_node`, `find_route` |
//! | [`config`]       | `ServiceConfig`, `ProjectionConfig` (TOML)               |
//! | [`error`]        | `QueryError`, `ErrorKind`, `Side`, `QueryResult<T>`      |
//!
//! # Concurrency
//!
//! A snapshot is immutable once built.  Any number of threads may query a
//! [`RouteService`] at once; each Dijkstra search owns its own scratch
//! state.  A rebuilt network is published with [`SharedSnapshot::replace`].
//!
//! # Feature flags
//!
//! | Flag       | Effect                                               |
//! |------------|------------------------------------------------------|
//! | `parallel` | `RouteService::route_batch` fans out with Rayon.     |

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod snapshot;


pub use config::{ProjectionConfig, ServiceConfig};
pub use error::{ErrorKind, QueryError, QueryResult, Side};
pub use orchestrator::{route, ResolvedEndpoint, RoutePlan};
pub use service::{Location, NodeMatch, NodeView, RouteResponse, RouteService, Suggestion};
pub use snapshot::{RoutingSnapshot, SharedSnapshot, SnapshotBuilder};
