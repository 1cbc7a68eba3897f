//! Traffic-subsystem error type.

use thiserror::Error;

use uts_core::EdgeId;

/// Errors produced by `uts-traffic`.
#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("accident `{0}` not found")]
    UnknownAccident(String),

    #[error("edge {0} already has an active accident")]
    DuplicateAccident(EdgeId),

    #[error("edge {0} is blocked; accidents cannot be placed on it")]
    EdgeBlocked(EdgeId),

    #[error("no eligible edge for a random accident")]
    NoEligibleEdge,
}

pub type TrafficResult<T> = Result<T, TrafficError>;
