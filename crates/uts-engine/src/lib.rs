//! `uts-engine` — the stateful simulation core of `rust_uts`.
//!
//! # Tick loop
//!
//! ```text
//! clock → incidents → multiplier refresh → car-following → integration
//!       → occupancy rebuild → reroute decider → tick summary
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`sim`]      | `Simulator` — tick passes, incident & blockage commands   |
//! | [`spawn`]    | `spawn` / `spawn_at` / `spawn_many`                       |
//! | [`snapshot`] | Serde-serialisable read-only projections & queries        |
//! | [`builder`]  | `SimBuilder`                                              |
//! | [`observer`] | `SimObserver` hook, `NoopObserver`                        |
//! | [`error`]    | `EngineError`, `EngineResult<T>`                          |
//!
//! # Concurrency model
//!
//! The engine is single-threaded cooperative: all mutation happens inside
//! `tick()` and command handlers on the owning thread.  A façade wraps the
//! simulator in one mutex; snapshot queries copy state between ticks, so no
//! reader can observe a half-integrated tick.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use uts_core::{SimConfig, VehicleMode};
//! use uts_engine::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig { seed: 42, ..Default::default() })
//!     .map("square")
//!     .build()?;
//! sim.spawn(VehicleMode::Car, Some("A"), Some("C"))?;
//! sim.run_ticks(100, 0.1, &mut NoopObserver);
//! println!("{:?}", sim.vehicle_statistics());
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;
pub mod spawn;


pub use builder::SimBuilder;
pub use error::{EngineError, EngineResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulator;
pub use snapshot::{
    AccidentView, AgentView, BlockageView, BottleneckView, CongestionReport, EdgeTrafficView,
    EdgeView, MapDataView, NodeView, PlanView, SimulationInfo, StateView, TickSummary,
    TrafficStats, VehicleStats,
};
