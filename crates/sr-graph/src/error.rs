//! Graph-subsystem error type.

use thiserror::Error;

use sr_core::{NodeId, SegmentId};

/// Errors produced by `sr-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path from {from} to {to}")]
    NoPathFound { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("spatial index is empty")]
    EmptyIndex,

    #[error("path search cancelled")]
    Cancelled,

    #[error("path search exceeded its deadline")]
    TimedOut,

    #[error("segment {segment} is degenerate: {reason}")]
    DegenerateSegment { segment: SegmentId, reason: String },

    #[error("segment {segment} has invalid length {length}")]
    InvalidLength { segment: SegmentId, length: f64 },

    #[error("graph is empty: {skipped} segment(s) read, none usable")]
    EmptyGraph { skipped: usize },

    #[error("segment parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// `true` for failures raised while building (bad or missing source data).
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            GraphError::DegenerateSegment { .. }
                | GraphError::InvalidLength { .. }
                | GraphError::EmptyGraph { .. }
                | GraphError::Parse(_)
                | GraphError::Io(_)
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
