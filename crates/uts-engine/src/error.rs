//! Engine error type, aggregating the sub-crate errors.

use thiserror::Error;

use uts_agent::AgentError;
use uts_core::CoreError;
use uts_graph::GraphError;
use uts_traffic::TrafficError;

/// Errors surfaced by simulator commands and queries.
///
/// Validation failures (unknown ids, bad distributions) report immediately
/// with no state change.  Planning failures propagate as
/// [`GraphError::NoPath`] inside the `Graph` variant; spawn treats them as
/// fatal for that spawn, the reroute decider as recoverable.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),

    #[error("no edge between `{from}` and `{to}`")]
    UnknownEdge { from: String, to: String },

    #[error("spawn distribution must be non-negative and sum to 1, got {weights:?}")]
    BadDistribution { weights: [f64; 3] },

    #[error("the loaded map has no nodes")]
    EmptyNetwork,
}

impl EngineError {
    /// `true` when the error is the planner's explicit no-path outcome —
    /// the one failure callers routinely branch on instead of bubbling up.
    pub fn is_no_path(&self) -> bool {
        matches!(self, EngineError::Graph(GraphError::NoPath { .. }))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
