//! Plain data row types written by report backends.

use uts_engine::{AgentView, TickSummary};

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummaryRow {
    pub step:           u64,
    pub dt:             f64,
    pub active_agents:  u64,
    pub moved_agents:   u64,
    pub arrived_agents: u64,
    pub accident_count: u64,
    pub blocked_count:  u64,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(summary: &TickSummary) -> Self {
        Self {
            step:           summary.step,
            dt:             summary.dt,
            active_agents:  summary.active as u64,
            moved_agents:   summary.moved as u64,
            arrived_agents: summary.arrived as u64,
            accident_count: summary.accidents.len() as u64,
            blocked_count:  summary.blocked.len() as u64,
        }
    }
}

/// A snapshot of one agent at a given step.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub step:             u64,
    pub agent:            String,
    pub mode:             String,
    pub status:           String,
    pub current:          String,
    pub next:             String,
    pub position_on_edge: f64,
    pub current_speed:    f64,
}

impl AgentSnapshotRow {
    pub fn from_view(step: u64, view: &AgentView) -> Self {
        Self {
            step,
            agent:            view.id.clone(),
            mode:             view.mode.clone(),
            status:           view.status.clone(),
            current:          view.current.clone(),
            next:             view.next.clone().unwrap_or_default(),
            position_on_edge: view.position_on_edge,
            current_speed:    view.current_speed,
        }
    }
}
