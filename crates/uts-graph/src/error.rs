//! Graph-subsystem error type.

use thiserror::Error;

use uts_core::NodeId;

/// Errors produced by `uts-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("duplicate node id `{0}` in map document")]
    DuplicateNode(String),

    #[error("edge {from} -> {to} has non-positive distance {distance}")]
    NonPositiveDistance {
        from:     String,
        to:       String,
        distance: f64,
    },

    #[error("endpoint {0} is not a node of the loaded network")]
    InvalidEndpoint(NodeId),

    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("unknown map `{0}`")]
    UnknownMap(String),

    #[error("map document parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
