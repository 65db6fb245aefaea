//! Read-only views of session state for the presentation layer.
//!
//! All types are owned copies -- no references into session storage -- so a
//! renderer can hold one across ticks.

use crate::grid::GridSize;
use crate::id::LevelId;
use crate::item::{Item, ItemKind};
use crate::level::TargetSpec;
use crate::machine::Machine;
use crate::sim::RunState;
use serde::{Deserialize, Serialize};

/// Everything needed to draw the floor after a tick or an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub level: LevelId,
    pub grid: GridSize,
    pub target: TargetSpec,
    /// Machines in row-major order.
    pub machines: Vec<Machine>,
    /// Items in engine order.
    pub items: Vec<Item>,
    pub run_state: RunState,
}

impl FloorSnapshot {
    /// Number of items of `kind` currently on the floor.
    pub fn count_items(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    /// Target progress as a `(done, required)` pair.
    pub fn progress(&self) -> (u32, u32) {
        (self.run_state.target_progress, self.target.count)
    }
}
