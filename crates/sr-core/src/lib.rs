//! `sr-core` — foundational types for the `streetroute` workspace.
//!
//! Every other `sr-*` crate depends on this one.  It has no `sr-*`
//! dependencies and a single required external one (`thiserror`), plus
//! optional `serde`.
//!
//! # What lives here
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`, `SegmentId`                               |
//! | [`geo`]    | `PlanarPoint`, `GeoPoint`, `Projection`, `TransverseMercator` |
//! | [`error`]  | `CoreError`, `CoreResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, Identity, PlanarPoint, Projection, TransverseMercator};
pub use ids::{EdgeId, NodeId, SegmentId};
