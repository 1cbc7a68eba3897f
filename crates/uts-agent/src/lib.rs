//! `uts-agent` — agent records and the indexed agent store.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`agent`] | `Agent` (closed kinematic record), `AgentStatus`            |
//! | [`store`] | `AgentStore` — by-id, by-label, and edge-occupancy indices  |
//! | [`error`] | `AgentError`, `AgentResult<T>`                              |

pub mod agent;
pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentStatus};
pub use error::{AgentError, AgentResult};
pub use store::AgentStore;
