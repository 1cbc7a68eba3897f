//! `uts-core` — foundational types for the `rust_uts` traffic simulator.
//!
//! This crate is a dependency of every other `uts-*` crate.  It intentionally
//! has no `uts-*` dependencies and minimal external ones (only `rand`,
//! `rand_distr`, and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `NodeId`, `EdgeId`, `AccidentId`           |
//! | [`point`]   | `Point`, Euclidean distance                           |
//! | [`mode`]    | `VehicleMode` enum, `ModeMask` bitmask                |
//! | [`config`]  | `SimConfig`, `SpeedProfile`                           |
//! | [`clock`]   | `SimClock` (step counter + clamped `dt`)              |
//! | [`rng`]     | `SimRng` (seeded simulation-level RNG)                |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod mode;
pub mod point;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::SimClock;
pub use config::{SimConfig, SpeedProfile};
pub use error::{CoreError, CoreResult};
pub use ids::{AccidentId, AgentId, EdgeId, NodeId};
pub use mode::{ModeMask, VehicleMode};
pub use point::Point;
pub use rng::SimRng;
