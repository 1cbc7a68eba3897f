//! Vehicle mode enum and the per-edge mode bitmask.
//!
//! The three modes form a closed set: every agent is exactly one of them,
//! and every edge carries a [`ModeMask`] saying which of them may use it.

use std::str::FromStr;

use crate::error::CoreError;

// ── VehicleMode ───────────────────────────────────────────────────────────────

/// The kind of agent travelling the network.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VehicleMode {
    Car,
    Bicycle,
    Pedestrian,
}

impl VehicleMode {
    /// All modes in declaration order.  Index with [`VehicleMode::index`].
    pub const ALL: [VehicleMode; 3] =
        [VehicleMode::Car, VehicleMode::Bicycle, VehicleMode::Pedestrian];

    /// Position in [`VehicleMode::ALL`], for indexing per-mode config arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase label, also the agent-label prefix (`car_0`, `bicycle_1`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleMode::Car        => "car",
            VehicleMode::Bicycle    => "bicycle",
            VehicleMode::Pedestrian => "pedestrian",
        }
    }
}

impl FromStr for VehicleMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "car"        => Ok(VehicleMode::Car),
            "bicycle"    => Ok(VehicleMode::Bicycle),
            "pedestrian" => Ok(VehicleMode::Pedestrian),
            other        => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for VehicleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ModeMask ──────────────────────────────────────────────────────────────────

/// Bitmask over [`VehicleMode`], stored per edge.
///
/// A `u8` is enough for the three modes; the mask is `Copy` and lives in the
/// graph's dense edge arrays.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeMask(u8);

impl ModeMask {
    /// No mode may use the edge.  Only reachable through explicit
    /// construction — the map loader defaults to [`ModeMask::ALL`].
    pub const EMPTY: ModeMask = ModeMask(0);

    /// Every mode may use the edge (the map-document default).
    pub const ALL: ModeMask = ModeMask(0b111);

    #[inline]
    fn bit(mode: VehicleMode) -> u8 {
        1 << mode.index()
    }

    /// Mask allowing exactly `mode`.
    #[inline]
    pub fn only(mode: VehicleMode) -> ModeMask {
        ModeMask(Self::bit(mode))
    }

    /// `true` iff `mode` is in the mask.
    #[inline]
    pub fn allows(self, mode: VehicleMode) -> bool {
        self.0 & Self::bit(mode) != 0
    }

    /// Add `mode` to the mask.
    #[inline]
    pub fn with(self, mode: VehicleMode) -> ModeMask {
        ModeMask(self.0 | Self::bit(mode))
    }

    /// The modes present in the mask, in declaration order.
    pub fn modes(self) -> impl Iterator<Item = VehicleMode> {
        VehicleMode::ALL.into_iter().filter(move |m| self.allows(*m))
    }
}

impl FromIterator<VehicleMode> for ModeMask {
    fn from_iter<I: IntoIterator<Item = VehicleMode>>(iter: I) -> Self {
        iter.into_iter().fold(ModeMask::EMPTY, ModeMask::with)
    }
}

impl Default for ModeMask {
    fn default() -> Self {
        ModeMask::ALL
    }
}
