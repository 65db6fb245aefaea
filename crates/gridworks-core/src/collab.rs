//! Narrow interfaces to the engine's external collaborators.
//!
//! The engine reads levels from a [`LevelRepository`] and hands finished
//! runs to a [`ScoreRecorder`]. Neither is consulted during a tick.

use crate::id::LevelId;
use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Supplies level records.
pub trait LevelRepository {
    /// All levels in ascending `order`.
    fn list(&self) -> Vec<Level>;

    /// The level with `id`, or `None` if there is no such level. Absence is
    /// an ordinary outcome, not an error.
    fn get(&self, id: LevelId) -> Option<Level>;
}

/// A finished run as submitted to the score recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub level: LevelId,
    pub player_name: String,
    pub score: u64,
    /// Whole seconds, floor of elapsed time.
    pub time_taken: u32,
}

/// Acknowledgement of a stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReceipt {
    /// Identifier the recorder assigned to the entry.
    pub entry: u64,
    /// 1-based leaderboard rank, `None` when the entry did not make the board.
    pub rank: Option<usize>,
}

/// Failures reported by a score recorder. None of these affect the already
/// committed run state.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The submission failed validation.
    #[error("invalid submission field '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// The recorder could not be reached or could not store the entry.
    #[error("score recorder unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accepts finished runs.
pub trait ScoreRecorder {
    fn record(&mut self, submission: ScoreSubmission) -> Result<RecordReceipt, RecordError>;
}
