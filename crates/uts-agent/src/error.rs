//! Agent-subsystem error type.

use thiserror::Error;

/// Errors produced by `uts-agent`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent `{0}` not found")]
    NotFound(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
