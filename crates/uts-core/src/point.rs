//! 2-D point type for the abstract map coordinate plane.
//!
//! Map documents place nodes on a flat plane with no particular unit; edge
//! distances are declared separately, so `Point` only has to support the
//! Euclidean metric used by the planner's heuristic and by nearest-node
//! snapping.

/// A position in the map's abstract 2-D coordinate plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.  Used as the planner heuristic and
    /// for nearest-node queries.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
