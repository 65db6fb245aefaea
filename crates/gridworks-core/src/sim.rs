//! Run state, engine configuration, and state hashing.

use crate::fixed::{Fixed64, Ticks, floor_seconds, millis_to_seconds};
use crate::id::LevelId;
use crate::machine::SpawnerMode;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Engine-wide tick period in milliseconds.
pub const TICK_INTERVAL_MS: u32 = 500;

/// Points for sinking an item of the level's target kind.
pub const TARGET_POINTS: u64 = 100;

/// Points for sinking any other item.
pub const SCRAP_POINTS: u64 = 10;

/// Longest tick period a [`SimConfig`] may ask for.
pub const MAX_TICK_INTERVAL_MS: u32 = 60_000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Engine configuration. Chosen at session construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Length of one tick in milliseconds. Also the amount added to elapsed
    /// time per tick.
    pub tick_interval_ms: u32,
    /// How spawners treat items already standing on their cell.
    pub spawner_mode: SpawnerMode,
}

/// Rejected engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick interval must be positive")]
    ZeroTickInterval,

    #[error("tick interval of {ms} ms exceeds {MAX_TICK_INTERVAL_MS} ms")]
    TickIntervalTooLong { ms: u32 },
}

impl SimConfig {
    /// Every tick must advance elapsed time, by a period small enough to
    /// accumulate in [`Fixed64`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.tick_interval_ms {
            0 => Err(ConfigError::ZeroTickInterval),
            ms if ms > MAX_TICK_INTERVAL_MS => Err(ConfigError::TickIntervalTooLong { ms }),
            _ => Ok(()),
        }
    }

    /// Elapsed seconds added by one tick.
    pub fn tick_seconds(&self) -> Fixed64 {
        millis_to_seconds(self.tick_interval_ms)
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms as u64)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            spawner_mode: SpawnerMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Where a run is in its lifecycle.
///
/// `Editing -> Running <-> Paused`, `Running -> Completed` on a win, and any
/// phase back to `Editing` on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Editing,
    Running,
    Paused,
    Completed,
}

impl Phase {
    fn tag(self) -> u32 {
        self as u32
    }
}

/// Score, progress and clock of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Target-kind items consumed so far.
    pub target_progress: u32,
    /// Seconds of simulated time.
    pub elapsed: Fixed64,
    pub phase: Phase,
    /// Ticks executed in this run.
    pub ticks: Ticks,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed time rounded down to whole seconds.
    pub fn elapsed_secs(&self) -> u32 {
        floor_seconds(self.elapsed)
    }
}

// ---------------------------------------------------------------------------
// Tick results
// ---------------------------------------------------------------------------

/// Per-tick accounting.
///
/// `consumed() == consumed_target + consumed_scrap` and
/// `score_delta == 100 * consumed_target + 10 * consumed_scrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickStats {
    pub consumed_target: u32,
    pub consumed_scrap: u32,
    /// Items dropped for leaving the grid.
    pub discarded: u32,
    pub spawned: u32,
    pub score_delta: u64,
}

impl TickStats {
    pub fn consumed(&self) -> u32 {
        self.consumed_target + self.consumed_scrap
    }
}

/// The terminal record of a won run, handed to the score recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCompletion {
    pub level: LevelId,
    pub score: u64,
    /// Floor of elapsed seconds.
    pub time_taken_secs: u32,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for replay verification.
///
/// 64-bit FNV-1a. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Mix `bytes` into the running hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Feed every field of a run state.
    pub fn write_run_state(&mut self, run: &RunState) {
        self.write_u64(run.score);
        self.write_u32(run.target_progress);
        self.write_fixed64(run.elapsed);
        self.write_u32(run.phase.tag());
        self.write_u64(run.ticks);
    }

    /// The hash of everything written so far.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
