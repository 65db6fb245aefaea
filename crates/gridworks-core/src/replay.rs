//! Replay recording and playback.
//!
//! A replay starts from a serialized session and records every command and
//! tick applied afterwards. Playing it back reproduces the same floor, items
//! and run state, optionally checked against state hashes taken while
//! recording.

use crate::command::Command;
use crate::serialize::{DeserializeError, SerializeError};
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayCommand {
    Apply(Command),
    Tick,
}

/// Where playback first diverged from the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub command_index: usize,
    pub expected_hash: u64,
    pub actual_hash: u64,
}

/// A recorded sequence of steps starting from a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Serialized session at the start of recording.
    pub initial_snapshot: Vec<u8>,
    pub commands: Vec<ReplayCommand>,
    /// `(command_index, state_hash)` pairs checked during playback.
    pub hash_checkpoints: Vec<(usize, u64)>,
}

impl ReplayLog {
    /// Start a recording from the session's current state.
    pub fn new(session: &Session) -> Result<Self, SerializeError> {
        Ok(Self {
            initial_snapshot: session.serialize()?,
            commands: Vec::new(),
            hash_checkpoints: Vec::new(),
        })
    }

    pub fn record(&mut self, cmd: ReplayCommand) {
        self.commands.push(cmd);
    }

    /// Record a step together with the state hash observed after it.
    pub fn record_with_hash(&mut self, cmd: ReplayCommand, hash: u64) {
        let index = self.commands.len();
        self.commands.push(cmd);
        self.hash_checkpoints.push((index, hash));
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        bitcode::serialize(self).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))
    }
}

/// Outcome of a verified playback.
#[derive(Debug)]
pub struct ReplayResult {
    pub commands_executed: usize,
    pub is_verified: bool,
    pub first_mismatch: Option<ReplayMismatch>,
    pub session: Session,
}

fn apply_step(session: &mut Session, cmd: &ReplayCommand) {
    match cmd {
        ReplayCommand::Apply(command) => {
            session.apply(command.clone());
        }
        ReplayCommand::Tick => {
            session.tick();
        }
    }
}

/// Play a log back and compare every checkpoint hash.
pub fn replay_and_verify(log: &ReplayLog) -> Result<ReplayResult, DeserializeError> {
    let mut session = Session::deserialize(&log.initial_snapshot)?;
    let mut first_mismatch = None;
    let mut checkpoint_idx = 0;

    for (i, cmd) in log.commands.iter().enumerate() {
        apply_step(&mut session, cmd);

        while checkpoint_idx < log.hash_checkpoints.len()
            && log.hash_checkpoints[checkpoint_idx].0 == i
        {
            let (_, expected_hash) = log.hash_checkpoints[checkpoint_idx];
            let actual_hash = session.state_hash();
            if actual_hash != expected_hash && first_mismatch.is_none() {
                tracing::warn!(
                    command_index = i,
                    expected_hash,
                    actual_hash,
                    "replay diverged"
                );
                first_mismatch = Some(ReplayMismatch {
                    command_index: i,
                    expected_hash,
                    actual_hash,
                });
            }
            checkpoint_idx += 1;
        }
    }

    Ok(ReplayResult {
        commands_executed: log.commands.len(),
        is_verified: first_mismatch.is_none(),
        first_mismatch,
        session,
    })
}

/// Play a log back without verification.
pub fn replay(log: &ReplayLog) -> Result<Session, DeserializeError> {
    let mut session = Session::deserialize(&log.initial_snapshot)?;
    for cmd in &log.commands {
        apply_step(&mut session, cmd);
    }
    Ok(session)
}
