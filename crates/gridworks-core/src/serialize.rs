//! Binary session snapshots.
//!
//! A snapshot captures the level, configuration, floor, items, run state and
//! the item id counter, encoded with `bitcode` behind a versioned header. The
//! event bus, listeners, tick source and command history are not captured.

use crate::floor::FactoryFloor;
use crate::item::Item;
use crate::level::Level;
use crate::session::Session;
use crate::sim::{RunState, SimConfig};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a session snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x6D17_0001;

/// Snapshot layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot holds an invalid level: {0}")]
    Level(#[from] crate::level::LevelError),
    #[error("snapshot holds an invalid config: {0}")]
    Config(#[from] crate::sim::ConfigError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count of the run when the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionSnapshot {
    header: SnapshotHeader,
    level: Level,
    config: SimConfig,
    floor: FactoryFloor,
    items: Vec<Item>,
    run_state: RunState,
    next_item_id: u64,
}

impl Session {
    /// Serialize the session into a binary blob.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let next_item_id = self.id_high_water().unwrap_or_else(|| {
            self.items()
                .iter()
                .map(|i| i.id.0 + 1)
                .max()
                .unwrap_or(0)
        });
        let snapshot = SessionSnapshot {
            header: SnapshotHeader::new(self.run_state().ticks),
            level: self.level().clone(),
            config: *self.config(),
            floor: self.floor().clone(),
            items: self.items().to_vec(),
            run_state: *self.run_state(),
            next_item_id,
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore a session from a binary blob.
    ///
    /// The event bus comes back empty; listeners must be re-registered. A
    /// running session resumes with its tick source active. Any pending
    /// completion is not carried over.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: SessionSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        snapshot.config.validate()?;

        let rules = snapshot.level.rules()?;
        let mut floor = snapshot.floor;
        floor.rebuild_index();

        tracing::debug!(
            level = %rules.level,
            tick = snapshot.header.tick,
            items = snapshot.items.len(),
            "session restored"
        );
        Ok(Session::from_parts(
            snapshot.level,
            rules,
            snapshot.config,
            floor,
            snapshot.items,
            snapshot.run_state,
            snapshot.next_item_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::grid::GridPos;
    use crate::machine::MachineKind;
    use crate::sim::Phase;
    use crate::test_utils::*;

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(3).validate().is_ok());

        let bad_magic = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(
            bad_magic.validate(),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        ));

        let future = SnapshotHeader {
            version: FORMAT_VERSION + 1,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(
            future.validate(),
            Err(DeserializeError::FutureVersion(_))
        ));

        let old = SnapshotHeader {
            version: 0,
            ..SnapshotHeader::new(0)
        };
        assert!(matches!(
            old.validate(),
            Err(DeserializeError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn paused_session_round_trips() {
        let mut session = cutting_line_session();
        session.apply(Command::Start);
        run_ticks(&mut session, 3);
        session.apply(Command::Pause);

        let bytes = session.serialize().unwrap();
        let restored = Session::deserialize(&bytes).unwrap();

        assert_eq!(restored.state_hash(), session.state_hash());
        assert_eq!(restored.phase(), Phase::Paused);
        assert_eq!(restored.level(), session.level());
        assert!(restored.floor().is_consistent());
        assert_eq!(
            restored.floor().machine_at(GridPos::new(1, 0)).map(|m| m.kind),
            Some(MachineKind::Cutter)
        );
    }

    #[test]
    fn restored_session_continues_identically() {
        let mut original = cutting_line_session();
        original.apply(Command::Start);
        run_ticks(&mut original, 2);

        let mut restored = Session::deserialize(&original.serialize().unwrap()).unwrap();
        assert!(restored.is_ticking());

        run_ticks(&mut original, 4);
        run_ticks(&mut restored, 4);
        assert_eq!(restored.state_hash(), original.state_hash());
        assert_eq!(restored.items(), original.items());
    }

    #[test]
    fn level_and_run_state_round_trip_through_bitcode() {
        use crate::fixed::Fixed64;
        use crate::level::Placement;

        let mut level = cutting_line_level();
        level.description = "Cut the raw material".into();
        level.available_machines = vec!["spawner".into(), "conveyor".into()];
        level.layout = vec![Placement {
            pos: GridPos::new(3, 0),
            kind: MachineKind::Sink,
        }];
        let bytes = bitcode::serialize(&level).unwrap();
        let back: Level = bitcode::deserialize(&bytes).unwrap();
        assert_eq!(back, level);

        let run = RunState {
            score: 1_230,
            target_progress: 9,
            elapsed: Fixed64::from_num(41.5),
            phase: Phase::Completed,
            ticks: 83,
        };
        let bytes = bitcode::serialize(&run).unwrap();
        let back: RunState = bitcode::deserialize(&bytes).unwrap();
        assert_eq!(back, run);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = Session::deserialize(&[0xFF, 0x00, 0x13]);
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }
}
