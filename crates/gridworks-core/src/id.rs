use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a machine placed on the factory floor.
    pub struct MachineId;
}

/// Identifies an item travelling across the floor. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

/// Identifies a level in the level repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub u32);

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Id sources
// ---------------------------------------------------------------------------

/// Supplies fresh item identifiers to the tick function.
///
/// Injected into the session so replays and tests can reproduce the exact
/// same identifiers.
pub trait IdSource {
    /// Produce an identifier never returned before by this source.
    fn next_item_id(&mut self) -> ItemId;

    /// The counter value to resume from after a snapshot, if the source is
    /// counter-based.
    fn high_water(&self) -> Option<u64> {
        None
    }
}

/// Monotonic counter. The default id source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Start counting at 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Start counting at `next`. Used when resuming from a snapshot.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// The value the next call will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }

    fn high_water(&self) -> Option<u64> {
        Some(self.next)
    }
}
