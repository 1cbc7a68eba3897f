//! Declarative map document format.
//!
//! A map is a JSON document listing nodes and edges:
//!
//! ```json
//! {
//!   "nodes": [ { "id": "A", "x": 0.0, "y": 0.0 } ],
//!   "edges": [
//!     { "from": "A", "to": "B", "distance": 60.0,
//!       "allowed_modes": ["car", "bicycle"], "one_way": false }
//!   ]
//! }
//! ```
//!
//! `allowed_modes` defaults to all three modes and `one_way` to `false`;
//! a non-one-way edge implies the reverse direction.  Validation happens at
//! build time: unique node ids, known edge endpoints, strictly positive
//! distances.

use serde::{Deserialize, Serialize};

use uts_core::{ModeMask, Point, VehicleMode};

use crate::error::GraphResult;
use crate::network::{RoadNetwork, RoadNetworkBuilder};

/// One node of a map document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    pub x:  f64,
    pub y:  f64,
}

/// One edge of a map document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    pub from:     String,
    pub to:       String,
    pub distance: f64,
    #[serde(default = "all_modes")]
    pub allowed_modes: Vec<VehicleMode>,
    #[serde(default)]
    pub one_way: bool,
}

fn all_modes() -> Vec<VehicleMode> {
    VehicleMode::ALL.to_vec()
}

/// A complete declarative map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDoc {
    pub nodes: Vec<NodeDef>,
    pub edges: Vec<EdgeDef>,
}

impl MapDoc {
    /// Parse a JSON map document.
    pub fn from_json(json: &str) -> GraphResult<MapDoc> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the document and build the immutable [`RoadNetwork`].
    pub fn build(&self) -> GraphResult<RoadNetwork> {
        let mut builder = RoadNetworkBuilder::new();
        for node in &self.nodes {
            builder.add_node(&node.id, Point::new(node.x, node.y))?;
        }
        for edge in &self.edges {
            let from = builder.node_id(&edge.from)?;
            let to   = builder.node_id(&edge.to)?;
            let mask: ModeMask = edge.allowed_modes.iter().copied().collect();
            builder.add_edge(from, to, edge.distance, mask, edge.one_way)?;
        }
        Ok(builder.build())
    }
}
