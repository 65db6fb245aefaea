//! In-memory [`LevelRepository`].

use crate::catalog::builtin_levels;
use crate::loader::{DataLoadError, load_levels};
use gridworks_core::collab::LevelRepository;
use gridworks_core::id::LevelId;
use gridworks_core::level::Level;
use std::collections::BTreeMap;
use std::path::Path;

/// Levels held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: BTreeMap<LevelId, Level>,
}

impl LevelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in levels.
    pub fn builtin() -> Self {
        builtin_levels().into_iter().collect()
    }

    /// Levels read from a data directory. See [`load_levels`].
    pub fn from_dir(dir: &Path) -> Result<Self, DataLoadError> {
        Ok(load_levels(dir)?.into_iter().collect())
    }

    /// Add or replace a level. Returns the level previously stored under
    /// the same id.
    pub fn insert(&mut self, level: Level) -> Option<Level> {
        self.levels.insert(level.id, level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<Level> for LevelCatalog {
    fn from_iter<I: IntoIterator<Item = Level>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for level in iter {
            catalog.insert(level);
        }
        catalog
    }
}

impl LevelRepository for LevelCatalog {
    fn list(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.levels.values().cloned().collect();
        levels.sort_by_key(|l| (l.order, l.id));
        levels
    }

    fn get(&self, id: LevelId) -> Option<Level> {
        self.levels.get(&id).cloned()
    }
}
