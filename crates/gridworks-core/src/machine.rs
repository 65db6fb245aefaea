//! Machine kinds and the per-cell item rules.
//!
//! Every rule is a total function of `(MachineKind, ItemKind)`. Adding a
//! machine kind forces an update to [`MachineKind::act`] at compile time.

use crate::grid::{Direction, GridPos};
use crate::id::MachineId;
use crate::item::ItemKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// MachineKind
// ---------------------------------------------------------------------------

/// The closed set of machines a player can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineKind {
    ConveyorRight,
    ConveyorDown,
    ConveyorLeft,
    ConveyorUp,
    Spawner,
    Sink,
    Cutter,
    Painter,
    Boxer,
}

impl MachineKind {
    /// Every machine kind, in declaration order.
    pub const ALL: [MachineKind; 9] = [
        MachineKind::ConveyorRight,
        MachineKind::ConveyorDown,
        MachineKind::ConveyorLeft,
        MachineKind::ConveyorUp,
        MachineKind::Spawner,
        MachineKind::Sink,
        MachineKind::Cutter,
        MachineKind::Painter,
        MachineKind::Boxer,
    ];

    /// Canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            MachineKind::ConveyorRight => "conveyor_right",
            MachineKind::ConveyorDown => "conveyor_down",
            MachineKind::ConveyorLeft => "conveyor_left",
            MachineKind::ConveyorUp => "conveyor_up",
            MachineKind::Spawner => "spawner",
            MachineKind::Sink => "sink",
            MachineKind::Cutter => "cutter",
            MachineKind::Painter => "painter",
            MachineKind::Boxer => "boxer",
        }
    }

    /// The name up to the first underscore: `conveyor` for all conveyors,
    /// otherwise the full name.
    pub fn family(self) -> &'static str {
        let name = self.as_str();
        name.split('_').next().unwrap_or(name)
    }

    /// Direction a conveyor pushes items, `None` for non-conveyors.
    pub fn conveyor_direction(self) -> Option<Direction> {
        match self {
            MachineKind::ConveyorRight => Some(Direction::Right),
            MachineKind::ConveyorDown => Some(Direction::Down),
            MachineKind::ConveyorLeft => Some(Direction::Left),
            MachineKind::ConveyorUp => Some(Direction::Up),
            MachineKind::Spawner
            | MachineKind::Sink
            | MachineKind::Cutter
            | MachineKind::Painter
            | MachineKind::Boxer => None,
        }
    }

    /// What this machine does to an item of `item` kind sitting on its cell.
    pub fn act(self, item: ItemKind, spawner_mode: SpawnerMode) -> ItemAction {
        match self {
            MachineKind::ConveyorRight => ItemAction::forward(Direction::Right, item),
            MachineKind::ConveyorDown => ItemAction::forward(Direction::Down, item),
            MachineKind::ConveyorLeft => ItemAction::forward(Direction::Left, item),
            MachineKind::ConveyorUp => ItemAction::forward(Direction::Up, item),
            // Processing machines always forward right, transforming only
            // their one accepted input.
            MachineKind::Cutter => ItemAction::forward(
                Direction::Right,
                transform(item, ItemKind::RawMaterial, ItemKind::CutMaterial),
            ),
            MachineKind::Painter => ItemAction::forward(
                Direction::Right,
                transform(item, ItemKind::CutMaterial, ItemKind::PaintedMaterial),
            ),
            MachineKind::Boxer => ItemAction::forward(
                Direction::Right,
                transform(item, ItemKind::PaintedMaterial, ItemKind::PackagedProduct),
            ),
            MachineKind::Sink => ItemAction::Consume,
            MachineKind::Spawner => match spawner_mode {
                SpawnerMode::ForwardRight => ItemAction::forward(Direction::Right, item),
                SpawnerMode::Hold => ItemAction::Stay,
            },
        }
    }

    /// Stable numeric tag used by the state hash.
    pub(crate) fn tag(self) -> u32 {
        self as u32
    }
}

fn transform(item: ItemKind, accepts: ItemKind, produces: ItemKind) -> ItemKind {
    if item == accepts { produces } else { item }
}

impl std::fmt::Display for MachineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine kind name that is not one of the nine known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown machine kind '{0}'")]
pub struct UnknownMachineKind(pub String);

impl FromStr for MachineKind {
    type Err = UnknownMachineKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MachineKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownMachineKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Spawner mode
// ---------------------------------------------------------------------------

/// How a spawner treats an item already sitting on its own cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnerMode {
    /// Push the item one cell right, like the processing machines. Lets a
    /// spawner feed an adjacent conveyor.
    #[default]
    ForwardRight,
    /// Leave the item in place. The item then blocks further spawning.
    Hold,
}

// ---------------------------------------------------------------------------
// ItemAction
// ---------------------------------------------------------------------------

/// The outcome of one machine acting on one item for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    /// Item keeps its cell and kind.
    Stay,
    /// Item moves one cell in `dir` and becomes `kind`.
    Move { dir: Direction, kind: ItemKind },
    /// Item is absorbed and scored.
    Consume,
}

impl ItemAction {
    fn forward(dir: Direction, kind: ItemKind) -> Self {
        ItemAction::Move { dir, kind }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// A machine placed on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub kind: MachineKind,
    pub pos: GridPos,
}
