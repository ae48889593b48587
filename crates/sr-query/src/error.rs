//! Query-layer error type.
//!
//! This is the one place where multi-step failures become a single error
//! naming the step that failed.  Build-time errors from the lower crates are
//! wrapped unchanged.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use sr_address::AddressError;
use sr_core::{CoreError, NodeId};
use sr_graph::GraphError;

/// Which endpoint of a route request an error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Start,
    End,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Start => "start",
            Side::End => "end",
        })
    }
}

/// Coarse classification used by the transport layer to pick a response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before touching any index.
    Input,
    /// Well-formed query, no answer in the data.
    NotFound,
    /// Search stopped by a deadline or cancel flag.
    Aborted,
    /// Loading or building the data failed.
    Build,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{side} query {query:?} is too short")]
    InvalidQuery { side: Side, query: String },

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("no address matches the {side} query {query:?}")]
    AddressNotFound { side: Side, query: String },

    #[error("no graph node found for the {side} address")]
    NodeNotFound { side: Side },

    #[error("street network has no nodes")]
    EmptyNetwork,

    #[error("no path from {from} to {to}")]
    NoPathFound { from: NodeId, to: NodeId },

    #[error("route search cancelled")]
    Cancelled,

    #[error("route search timed out")]
    TimedOut,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not build route geometry: {0}")]
    Geometry(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidQuery { .. } | QueryError::InvalidCoordinate(_) => ErrorKind::Input,
            QueryError::AddressNotFound { .. }
            | QueryError::NodeNotFound { .. }
            | QueryError::EmptyNetwork
            | QueryError::NoPathFound { .. } => ErrorKind::NotFound,
            QueryError::Cancelled | QueryError::TimedOut => ErrorKind::Aborted,
            QueryError::Config(_)
            | QueryError::Geometry(_)
            | QueryError::Graph(_)
            | QueryError::Address(_)
            | QueryError::Core(_) => ErrorKind::Build,
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;
