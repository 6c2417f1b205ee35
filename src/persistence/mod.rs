//! High score storage
//!
//! One JSON object keyed by terminal size (`"80x24"`), each value a top-5
//! list. A missing or corrupt file reads as empty; failed saves are logged
//! and otherwise ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GameError, Result};
use crate::highscores::{HighScoreEntry, HighScores};

/// Score table storage, one table per dimension key
pub trait ScoreStore {
    fn load_high_scores(&self, key: &str) -> HighScores;
    fn save_high_scores(&mut self, key: &str, entries: &[HighScoreEntry]);
}

type ScoreFile = BTreeMap<String, Vec<HighScoreEntry>>;

/// Scores in a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonScoreFile {
    path: PathBuf,
}

impl JsonScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<ScoreFile> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Every stored table, so a save keeps other screen sizes' scores
    fn existing_tables(&self) -> ScoreFile {
        match self.read_all() {
            Ok(data) => data,
            Err(GameError::Io(e)) if e.kind() == io::ErrorKind::NotFound => ScoreFile::new(),
            Err(e) => {
                log::warn!(
                    "High score file {} is unreadable ({}); overwriting all tables",
                    self.path.display(),
                    e
                );
                ScoreFile::new()
            }
        }
    }

    fn write(&self, key: &str, entries: &[HighScoreEntry]) -> Result<()> {
        let mut data = self.existing_tables();
        data.insert(key.to_string(), entries.to_vec());
        fs::write(&self.path, serde_json::to_string_pretty(&data)?)?;
        Ok(())
    }
}

impl ScoreStore for JsonScoreFile {
    fn load_high_scores(&self, key: &str) -> HighScores {
        match self.read_all() {
            Ok(mut data) => {
                let entries = data.remove(key).unwrap_or_default();
                log::info!("Loaded {} high scores for {}", entries.len(), key);
                HighScores::from_entries(entries)
            }
            Err(e) => {
                log::info!("No high scores found ({}), starting fresh", e);
                HighScores::new()
            }
        }
    }

    fn save_high_scores(&mut self, key: &str, entries: &[HighScoreEntry]) {
        match self.write(key, entries) {
            Ok(()) => log::info!("High scores saved ({} entries)", entries.len()),
            Err(e) => log::warn!(
                "Failed to save high scores to {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// In-memory store for tests and runs without a writable disk
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    tables: ScoreFile,
}

impl ScoreStore for MemoryScoreStore {
    fn load_high_scores(&self, key: &str) -> HighScores {
        HighScores::from_entries(self.tables.get(key).cloned().unwrap_or_default())
    }

    fn save_high_scores(&mut self, key: &str, entries: &[HighScoreEntry]) {
        self.tables.insert(key.to_string(), entries.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("babaam-scores-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = JsonScoreFile::new("/nonexistent/dir/scores.json");
        assert!(store.load_high_scores("80x24").is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "[[[").expect("write temp file");
        let store = JsonScoreFile::new(&path);
        assert!(store.load_high_scores("80x24").is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_tables_kept_per_dimension() {
        let path = temp_path("dims");
        let mut store = JsonScoreFile::new(&path);
        let mut small = HighScores::new();
        small.add_score(120, "abc");
        let mut large = HighScores::new();
        large.add_score(900, "xyz");

        store.save_high_scores("80x24", &small.entries);
        store.save_high_scores("120x40", &large.entries);

        assert_eq!(store.load_high_scores("80x24"), small);
        assert_eq!(store.load_high_scores("120x40"), large);
        assert!(store.load_high_scores("100x30").is_empty());

        let raw = fs::read_to_string(&path).expect("read scores");
        assert!(raw.contains("\"initials\": \"ABC\""));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_over_corrupt_file_starts_fresh() {
        let path = temp_path("overwrite");
        fs::write(&path, "{ \"80x24\": [").expect("write temp file");
        let mut store = JsonScoreFile::new(&path);
        assert!(store.existing_tables().is_empty());

        let mut scores = HighScores::new();
        scores.add_score(70, "amy");
        store.save_high_scores("120x40", &scores.entries);
        assert_eq!(store.load_high_scores("120x40"), scores);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_has_no_tables() {
        let store = JsonScoreFile::new(temp_path("never-written"));
        assert!(store.existing_tables().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut store = JsonScoreFile::new("/nonexistent/dir/scores.json");
        store.save_high_scores("80x24", &[]);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryScoreStore::default();
        let mut scores = HighScores::new();
        scores.add_score(10, "me");
        store.save_high_scores("80x24", &scores.entries);
        assert_eq!(store.load_high_scores("80x24").top_score(), Some(10));
    }
}
