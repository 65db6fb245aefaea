//! Data-side collaborators for the Gridworks engine: level files, the
//! built-in level catalog, and the leaderboard.

pub mod catalog;
pub mod leaderboard;
pub mod loader;
pub mod repository;

pub use catalog::builtin_levels;
pub use leaderboard::{HighScore, Leaderboard, MAX_HIGH_SCORES};
pub use loader::{DataLoadError, load_levels};
pub use repository::LevelCatalog;
