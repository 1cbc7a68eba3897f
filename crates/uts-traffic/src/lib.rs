//! `uts-traffic` — the dynamic congestion field and incident model.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`congestion`] | `CongestionLevel` bands, `MultiplierField`, `CongestionAnalyzer` |
//! | [`incident`]   | `Severity`, `Accident`, `AccidentTable`, `BlockedEdges`       |
//! | [`error`]      | `TrafficError`, `TrafficResult<T>`                            |
//!
//! The analyser derives a per-edge density from the agent store's occupancy
//! index, classifies it into one of five bands, and draws band-distributed
//! multiplier samples into a bounded per-edge history.  The engine composes
//! these pieces every tick: sampled multiplier → accident boost → hotspot
//! buildup → blocked sentinel.

pub mod congestion;
pub mod error;
pub mod incident;

#[cfg(test)]
mod tests;

pub use congestion::{CongestionAnalyzer, CongestionLevel, MultiplierField, BLOCKED_MULTIPLIER};
pub use error::{TrafficError, TrafficResult};
pub use incident::{
    random_duration, random_severity, Accident, AccidentTable, Blockage, BlockedEdges, Severity,
};
