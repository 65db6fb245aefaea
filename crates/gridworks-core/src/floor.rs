//! The factory floor: machine storage with a one-machine-per-cell index.

use crate::grid::GridPos;
use crate::id::MachineId;
use crate::machine::{Machine, MachineKind};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Machines keyed by [`MachineId`], plus a position index.
///
/// Invariant: every machine has exactly one index entry and every index entry
/// points at a machine standing on that cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryFloor {
    machines: SlotMap<MachineId, Machine>,
    #[serde(skip)]
    by_pos: HashMap<GridPos, MachineId>,
}

impl FactoryFloor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a machine, replacing any machine already on `pos`.
    /// Returns the new machine's id and the displaced machine, if any.
    pub fn place(&mut self, pos: GridPos, kind: MachineKind) -> (MachineId, Option<Machine>) {
        let displaced = self.remove(pos);
        let id = self.machines.insert_with_key(|id| Machine { id, kind, pos });
        self.by_pos.insert(pos, id);
        (id, displaced)
    }

    /// Remove the machine on `pos`, if any.
    pub fn remove(&mut self, pos: GridPos) -> Option<Machine> {
        let id = self.by_pos.remove(&pos)?;
        self.machines.remove(id)
    }

    /// Remove every machine.
    pub fn clear_all(&mut self) {
        self.machines.clear();
        self.by_pos.clear();
    }

    pub fn machine_at(&self, pos: GridPos) -> Option<&Machine> {
        self.by_pos.get(&pos).and_then(|id| self.machines.get(*id))
    }

    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Iterate machines in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Machine> {
        self.machines.values()
    }

    /// Machines in row-major position order. Stable regardless of the order
    /// in which they were placed.
    pub fn machines_sorted(&self) -> Vec<&Machine> {
        let mut out: Vec<&Machine> = self.machines.values().collect();
        out.sort_by_key(|m| m.pos.row_major());
        out
    }

    /// Rebuild the position index from machine storage. Needed after
    /// deserialization since the index is not persisted.
    pub(crate) fn rebuild_index(&mut self) {
        self.by_pos = self.machines.iter().map(|(id, m)| (m.pos, id)).collect();
    }

    /// Check the index invariant. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        self.by_pos.len() == self.machines.len()
            && self
                .by_pos
                .iter()
                .all(|(pos, id)| self.machines.get(*id).is_some_and(|m| m.pos == *pos))
    }
}
