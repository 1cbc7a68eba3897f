//! Named map catalog backing the `load_map` / `maps()` commands.
//!
//! The catalog ships two built-in maps and accepts registrations of further
//! documents (e.g. parsed from files by an application crate).  Map ids are
//! listed in sorted order for stable snapshots.

use std::collections::BTreeMap;

use uts_core::VehicleMode;

use crate::error::{GraphError, GraphResult};
use crate::map::{EdgeDef, MapDoc, NodeDef};

/// A 4-node square with 60-unit bidirectional all-mode edges.  The smallest
/// map on which multi-hop routing, congestion, and blockage behaviour can be
/// exercised.
const SQUARE_JSON: &str = r#"{
  "nodes": [
    { "id": "A", "x": 0.0,  "y": 0.0 },
    { "id": "B", "x": 60.0, "y": 0.0 },
    { "id": "C", "x": 60.0, "y": 60.0 },
    { "id": "D", "x": 0.0,  "y": 60.0 }
  ],
  "edges": [
    { "from": "A", "to": "B", "distance": 60.0 },
    { "from": "B", "to": "C", "distance": 60.0 },
    { "from": "C", "to": "D", "distance": 60.0 },
    { "from": "D", "to": "A", "distance": 60.0 }
  ]
}"#;

/// Registry of known maps.
pub struct MapCatalog {
    maps: BTreeMap<String, MapDoc>,
}

impl MapCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self { maps: BTreeMap::new() }
    }

    /// Catalog pre-populated with the built-in `square` and `downtown` maps.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        let square = MapDoc::from_json(SQUARE_JSON)
            .unwrap_or_else(|e| unreachable!("built-in square map is valid: {e}"));
        catalog.register("square", square);
        catalog.register("downtown", downtown_grid());
        catalog
    }

    /// Register (or replace) a map document under `id`.
    pub fn register(&mut self, id: &str, doc: MapDoc) {
        self.maps.insert(id.to_string(), doc);
    }

    /// Look up a map document.
    pub fn get(&self, id: &str) -> GraphResult<&MapDoc> {
        self.maps
            .get(id)
            .ok_or_else(|| GraphError::UnknownMap(id.to_string()))
    }

    /// All registered map ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.maps.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// 4×4 street grid with 80-unit blocks.
///
/// Texture on top of the plain grid:
/// - the top row (`n00` → `n03`) is a one-way avenue, eastbound only;
/// - the bottom row is car-only (an arterial without footpaths);
/// - one diagonal greenway (`n10` → `n01`) is closed to cars.
fn downtown_grid() -> MapDoc {
    const SIDE: usize = 4;
    const BLOCK: f64 = 80.0;

    let mut nodes = Vec::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            nodes.push(NodeDef {
                id: format!("n{row}{col}"),
                x: col as f64 * BLOCK,
                y: row as f64 * BLOCK,
            });
        }
    }

    let mut edges = Vec::new();
    let all = VehicleMode::ALL.to_vec();
    let cars_only = vec![VehicleMode::Car];
    for row in 0..SIDE {
        for col in 0..SIDE {
            // Horizontal street to the east neighbour.
            if col + 1 < SIDE {
                let modes = if row == SIDE - 1 { cars_only.clone() } else { all.clone() };
                edges.push(EdgeDef {
                    from: format!("n{row}{col}"),
                    to: format!("n{row}{}", col + 1),
                    distance: BLOCK,
                    allowed_modes: modes,
                    one_way: row == 0,
                });
            }
            // Vertical street to the south neighbour.
            if row + 1 < SIDE {
                edges.push(EdgeDef {
                    from: format!("n{row}{col}"),
                    to: format!("n{}{col}", row + 1),
                    distance: BLOCK,
                    allowed_modes: all.clone(),
                    one_way: false,
                });
            }
        }
    }
    // Diagonal greenway, closed to cars.
    edges.push(EdgeDef {
        from: "n10".to_string(),
        to: "n01".to_string(),
        distance: BLOCK * std::f64::consts::SQRT_2,
        allowed_modes: vec![VehicleMode::Bicycle, VehicleMode::Pedestrian],
        one_way: false,
    });

    MapDoc { nodes, edges }
}
