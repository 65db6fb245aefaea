//! Edit and run-control commands accepted by a session.
//!
//! Commands arrive between ticks. A command that is not allowed in the
//! current phase is rejected as a value, never as an error: the caller can
//! show the reason or ignore it.

use crate::fixed::Ticks;
use crate::grid::GridPos;
use crate::machine::MachineKind;
use crate::sim::Phase;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single command from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Place a machine, replacing any machine already on the cell.
    PlaceMachine { pos: GridPos, kind: MachineKind },
    /// Remove the machine on a cell.
    RemoveMachine { pos: GridPos },
    /// Reset the run and remove every machine.
    ClearFloor,
    /// Begin or resume ticking.
    Start,
    /// Stop ticking, keeping all state.
    Pause,
    /// Back to editing with an empty item set and zeroed run state.
    Reset,
}

/// Why a command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Floor edits are not accepted while the simulation runs.
    Running,
    /// The target cell lies outside the grid.
    OutOfBounds,
    /// The level does not offer this machine kind.
    NotAvailable,
    /// There is no machine on the cell to remove.
    NoMachine,
    /// The run-control command does not apply in this phase.
    InvalidTransition { from: Phase },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Running => f.write_str("simulation is running"),
            RejectReason::OutOfBounds => f.write_str("cell is outside the grid"),
            RejectReason::NotAvailable => f.write_str("machine is not available on this level"),
            RejectReason::NoMachine => f.write_str("no machine on that cell"),
            RejectReason::InvalidTransition { from } => {
                write!(f, "not allowed while {from:?}")
            }
        }
    }
}

/// The result of applying a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Applied,
    Rejected(RejectReason),
}

impl CommandOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

// ---------------------------------------------------------------------------
// CommandLog
// ---------------------------------------------------------------------------

/// Bounded history of applied commands, tagged with the tick count at which
/// they were applied.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    history: Vec<(Ticks, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl CommandLog {
    /// A log that records nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that retains up to `max_history` entries.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            history: Vec::new(),
            max_history,
        }
    }

    pub fn record(&mut self, tick: Ticks, command: Command) {
        if self.max_history == 0 {
            return;
        }
        self.history.push((tick, command));
        let excess = self.history.len().saturating_sub(self.max_history);
        if excess > 0 {
            self.history.drain(..excess);
        }
    }

    pub fn history(&self) -> &[(Ticks, Command)] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
