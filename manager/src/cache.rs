use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::get_data_dir;
use crate::error::ConfigError;
use crate::game::GameRecord;

pub const SNAPSHOT_FILE_NAME: &str = "scanned_games.json";

/// Last scan results, kept as a flat JSON array.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(get_data_dir().join(SNAPSHOT_FILE_NAME))
    }
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or corrupt snapshots load as an empty list.
    pub fn load_games(&self) -> Vec<GameRecord> {
        if !self.path.exists() {
            debug!("No snapshot at {}", self.path.display());
            return Vec::new();
        }
        if let Ok(content) = fs::read_to_string(&self.path) {
            match serde_json::from_str(&content) {
                Ok(games) => return games,
                Err(e) => warn!("Ignoring corrupt snapshot {}: {}", self.path.display(), e),
            }
        }
        Vec::new()
    }

    pub fn save_games(&self, games: &[GameRecord]) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(games).map_err(|source| ConfigError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(io_err)?;
        debug!("Saved {} games to {}", games.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Platform;

    #[test]
    fn saved_games_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join(SNAPSHOT_FILE_NAME));
        let games = vec![
            GameRecord::new("Foo", "/g/Foo", "/g/Foo/foo.exe", Platform::Steam),
            GameRecord::new("Bar", "/g/Bar", "/g/Bar/bin/bar.exe", Platform::Gog),
        ];
        store.save_games(&games).unwrap();
        assert_eq!(store.load_games(), games);
    }

    #[test]
    fn corrupt_snapshot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE_NAME);
        fs::write(&path, "[{ \"name\": ").unwrap();
        assert!(SnapshotStore::new(path).load_games().is_empty());
    }
}
