//! Level descriptors and their validation.
//!
//! A [`Level`] is the record supplied by the level repository. It is checked
//! once, before a run, and reduced to the [`LevelRules`] the tick function
//! needs. Malformed levels never reach the tick loop.

use crate::grid::{GridPos, GridSize};
use crate::id::LevelId;
use crate::item::ItemKind;
use crate::machine::MachineKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest grid width or height. Every cell must be addressable by a
/// [`GridPos`].
pub const MAX_GRID_DIMENSION: u32 = i32::MAX as u32;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration errors detected before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("{level} has no target item")]
    MissingTarget { level: LevelId },

    #[error("{level} target count must be positive")]
    ZeroTargetCount { level: LevelId },

    #[error("{level} grid must be non-empty, got {width}x{height}")]
    EmptyGrid {
        level: LevelId,
        width: u32,
        height: u32,
    },

    #[error("{level} grid {width}x{height} exceeds {MAX_GRID_DIMENSION} cells per side")]
    GridTooLarge {
        level: LevelId,
        width: u32,
        height: u32,
    },

    #[error("{level} offers unknown machine '{name}'")]
    UnknownMachine { level: LevelId, name: String },

    #[error("{level} layout places a machine outside the grid at {pos}")]
    LayoutOutOfBounds { level: LevelId, pos: GridPos },

    #[error("{level} layout places two machines at {pos}")]
    LayoutOverlap { level: LevelId, pos: GridPos },
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// The item kind a level asks for, and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(rename = "type")]
    pub item: ItemKind,
    pub count: u32,
}

/// A machine pre-placed by the level designer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub pos: GridPos,
    #[serde(rename = "type")]
    pub kind: MachineKind,
}

/// A level record. Field names also accept the camelCase spelling used by
/// the level repository's JSON payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "gridWidth", default = "default_grid_dim")]
    pub grid_width: u32,
    #[serde(alias = "gridHeight", default = "default_grid_dim")]
    pub grid_height: u32,
    #[serde(alias = "targetItems", default)]
    pub target_items: Option<TargetSpec>,
    #[serde(alias = "availableMachines", default)]
    pub available_machines: Vec<String>,
    #[serde(default)]
    pub layout: Vec<Placement>,
    pub order: i32,
}

fn default_grid_dim() -> u32 {
    10
}

/// The validated subset of a [`Level`] that the tick function reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRules {
    pub level: LevelId,
    pub grid: GridSize,
    pub target: TargetSpec,
}

impl Level {
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.grid_width, self.grid_height)
    }

    /// Check the level and reduce it to the rules the engine runs against.
    pub fn rules(&self) -> Result<LevelRules, LevelError> {
        let level = self.id;
        let target = self.target_items.ok_or(LevelError::MissingTarget { level })?;
        if target.count == 0 {
            return Err(LevelError::ZeroTargetCount { level });
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(LevelError::EmptyGrid {
                level,
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.grid_width > MAX_GRID_DIMENSION || self.grid_height > MAX_GRID_DIMENSION {
            return Err(LevelError::GridTooLarge {
                level,
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        for name in &self.available_machines {
            let known = MachineKind::ALL
                .into_iter()
                .any(|k| k.as_str() == name || k.family() == name);
            if !known {
                return Err(LevelError::UnknownMachine {
                    level,
                    name: name.clone(),
                });
            }
        }

        let grid = self.grid();
        let mut seen = HashSet::new();
        for placement in &self.layout {
            if !grid.contains(placement.pos) {
                return Err(LevelError::LayoutOutOfBounds {
                    level,
                    pos: placement.pos,
                });
            }
            if !seen.insert(placement.pos) {
                return Err(LevelError::LayoutOverlap {
                    level,
                    pos: placement.pos,
                });
            }
        }

        Ok(LevelRules {
            level,
            grid,
            target,
        })
    }

    /// Shorthand for `self.rules().map(|_| ())`.
    pub fn validate(&self) -> Result<(), LevelError> {
        self.rules().map(|_| ())
    }

    /// Whether the player may place `kind` on this level. Matches either the
    /// exact machine name or its family (`"conveyor"` enables all four
    /// conveyors). An empty list allows everything.
    pub fn allows(&self, kind: MachineKind) -> bool {
        self.available_machines.is_empty()
            || self
                .available_machines
                .iter()
                .any(|name| name == kind.as_str() || name == kind.family())
    }

    /// The machine kinds offered on this level, in declaration order.
    pub fn offered_machines(&self) -> Vec<MachineKind> {
        MachineKind::ALL
            .into_iter()
            .filter(|k| self.allows(*k))
            .collect()
    }
}
