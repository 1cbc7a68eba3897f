//! `uts-report` — file export of simulation telemetry.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`row`]      | `TickSummaryRow`, `AgentSnapshotRow` plain data rows     |
//! | [`writer`]   | `ReportWriter` trait implemented by backends             |
//! | [`csv`]      | `CsvReporter` — two CSV files in an output directory     |
//! | [`observer`] | `ReportObserver<W>` — bridges `SimObserver` to a writer  |
//! | [`error`]    | `ReportError`, `ReportResult<T>`                         |
//!
//! The engine knows nothing about output formats; it only calls
//! [`SimObserver`][uts_engine::SimObserver] hooks.  `ReportObserver` adapts
//! those hooks to a [`ReportWriter`] backend, storing the first write error
//! internally (observer callbacks cannot return one).

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvReporter;
pub use error::{ReportError, ReportResult};
pub use observer::ReportObserver;
pub use row::{AgentSnapshotRow, TickSummaryRow};
pub use writer::ReportWriter;
