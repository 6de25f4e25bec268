//! Snapshot persistence in a JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use slide2048_core::{Snapshot, StateStore, StoreError};

/// Stores the game as pretty-printed JSON at `path`.
///
/// Writes go to a sibling temp file first and are renamed into place, so
/// an interrupted save never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStore {
    fn load(&mut self) -> Result<Option<Snapshot>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(Snapshot::from_json(&text)?))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(snapshot)
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide2048_core::{Direction, Game, Scores};

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("game.json");
        let mut store = FileStore::new(&path);

        let mut scores = Scores::with_best(64);
        scores.add(12);
        let snapshot = Snapshot::scores_only(scores);
        store.save(&snapshot).unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(FileStore::new(&path).load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        fs::write(&path, "{ definitely not a snapshot").unwrap();
        assert!(FileStore::new(&path).load().is_err());
    }

    #[test]
    fn test_game_resumes_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");

        let mut first = Game::with_store(5, FileStore::new(&path));
        first.step(Direction::Left);
        first.step(Direction::Down);

        let second = Game::with_store(6, FileStore::new(&path));
        assert_eq!(second.board(), first.board());
        assert_eq!(second.scores(), first.scores());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        fs::write(&path, "[]").unwrap();

        let game = Game::with_store(1, FileStore::new(&path));
        assert_eq!(game.empty_count(), 14);
        assert_eq!(game.scores(), Scores::default());
        // The fresh game has replaced the unreadable file.
        assert!(FileStore::new(&path).load().unwrap().is_some());
    }
}
