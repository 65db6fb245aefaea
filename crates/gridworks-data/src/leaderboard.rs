//! High-score table implementing [`ScoreRecorder`].
//!
//! Every submission is kept. Queries rank a level's entries by score
//! (descending), then time taken (descending), then submission order, and
//! return the first [`MAX_HIGH_SCORES`].

use crate::loader::{DataLoadError, deserialize_file};
use gridworks_core::collab::{RecordError, RecordReceipt, ScoreRecorder, ScoreSubmission};
use gridworks_core::id::LevelId;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;

/// Entries returned per level.
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest accepted player name, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    /// Assigned in submission order, starting at 1.
    pub entry: u64,
    pub level: LevelId,
    pub player_name: String,
    pub score: u64,
    /// Whole seconds.
    pub time_taken: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<HighScore>,
    next_entry: u64,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries stored across all levels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The best [`MAX_HIGH_SCORES`] entries for `level`, best first.
    pub fn top(&self, level: LevelId) -> Vec<HighScore> {
        let mut ranked: Vec<&HighScore> =
            self.entries.iter().filter(|e| e.level == level).collect();
        ranked.sort_by_key(|e| (Reverse(e.score), Reverse(e.time_taken), e.entry));
        ranked
            .into_iter()
            .take(MAX_HIGH_SCORES)
            .cloned()
            .collect()
    }

    /// 1-based rank of `entry` on its level's board, if it is on it.
    pub fn rank_of(&self, level: LevelId, entry: u64) -> Option<usize> {
        self.top(level)
            .iter()
            .position(|e| e.entry == entry)
            .map(|i| i + 1)
    }

    /// Read a leaderboard file (JSON, RON or TOML by extension).
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let board: Self = deserialize_file(path)?;
        tracing::debug!(file = %path.display(), entries = board.len(), "leaderboard loaded");
        Ok(board)
    }

    /// Write the leaderboard as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), DataLoadError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn validate(submission: &ScoreSubmission) -> Result<(), RecordError> {
    let name = submission.player_name.trim();
    if name.is_empty() {
        return Err(RecordError::Invalid {
            field: "player_name",
            message: "player name must not be empty".to_string(),
        });
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(RecordError::Invalid {
            field: "player_name",
            message: format!("player name longer than {MAX_PLAYER_NAME_LEN} characters"),
        });
    }
    Ok(())
}

impl ScoreRecorder for Leaderboard {
    fn record(&mut self, submission: ScoreSubmission) -> Result<RecordReceipt, RecordError> {
        validate(&submission)?;

        self.next_entry += 1;
        let entry = self.next_entry;
        let level = submission.level;
        self.entries.push(HighScore {
            entry,
            level,
            player_name: submission.player_name.trim().to_string(),
            score: submission.score,
            time_taken: submission.time_taken,
        });

        let rank = self.rank_of(level, entry);
        tracing::info!(%level, entry, score = submission.score, ?rank, "high score recorded");
        Ok(RecordReceipt { entry, rank })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(
        board: &mut Leaderboard,
        level: u32,
        name: &str,
        score: u64,
        time: u32,
    ) -> RecordReceipt {
        board
            .record(ScoreSubmission {
                level: LevelId(level),
                player_name: name.to_string(),
                score,
                time_taken: time,
            })
            .unwrap()
    }

    #[test]
    fn ranks_by_score_then_time_then_submission() {
        let mut board = Leaderboard::new();
        submit(&mut board, 1, "a", 500, 30);
        submit(&mut board, 1, "b", 700, 10);
        submit(&mut board, 1, "c", 500, 45);
        submit(&mut board, 1, "d", 500, 45);

        let names: Vec<_> = board
            .top(LevelId(1))
            .into_iter()
            .map(|e| e.player_name)
            .collect();
        assert_eq!(names, vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn boards_are_per_level() {
        let mut board = Leaderboard::new();
        submit(&mut board, 1, "a", 100, 5);
        let receipt = submit(&mut board, 2, "b", 50, 5);
        assert_eq!(receipt.rank, Some(1));
        assert_eq!(board.top(LevelId(1)).len(), 1);
        assert_eq!(board.top(LevelId(2)).len(), 1);
        assert!(board.top(LevelId(3)).is_empty());
    }

    #[test]
    fn only_ten_entries_are_listed() {
        let mut board = Leaderboard::new();
        for i in 0..12 {
            submit(&mut board, 1, &format!("p{i}"), 100 + i, 5);
        }
        let top = board.top(LevelId(1));
        assert_eq!(top.len(), MAX_HIGH_SCORES);
        assert_eq!(top[0].score, 111);

        let low = submit(&mut board, 1, "late", 1, 5);
        assert_eq!(low.rank, None);
        let high = submit(&mut board, 1, "best", 1_000, 5);
        assert_eq!(high.rank, Some(1));
        assert_eq!(board.len(), 14);
    }

    #[test]
    fn rejects_blank_and_overlong_names() {
        let mut board = Leaderboard::new();
        let long = "x".repeat(MAX_PLAYER_NAME_LEN + 1);
        for name in ["", "   ", long.as_str()] {
            let err = board
                .record(ScoreSubmission {
                    level: LevelId(1),
                    player_name: name.to_string(),
                    score: 10,
                    time_taken: 1,
                })
                .unwrap_err();
            assert!(matches!(
                err,
                RecordError::Invalid {
                    field: "player_name",
                    ..
                }
            ));
        }
        assert!(board.is_empty());
    }

    #[test]
    fn names_are_trimmed() {
        let mut board = Leaderboard::new();
        submit(&mut board, 1, "  Ada  ", 10, 1);
        assert_eq!(board.top(LevelId(1))[0].player_name, "Ada");
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut board = Leaderboard::new();
        submit(&mut board, 1, "a", 300, 12);
        submit(&mut board, 4, "b", 500, 40);

        let path = std::env::temp_dir().join(format!(
            "gridworks_leaderboard_{}.json",
            std::process::id()
        ));
        board.save(&path).unwrap();
        let loaded = Leaderboard::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, board);
        let mut loaded = loaded;
        let receipt = submit(&mut loaded, 1, "c", 1, 1);
        assert_eq!(receipt.entry, 3);
    }
}
