//! Best-score persistence
//!
//! The stored value is a single decimal integer. A missing or unreadable
//! value counts as 0; it is never reported as an error to the game.

use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum HighScoreError {
    #[error("failed to create directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write high score to {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Somewhere to keep the best score between sessions
pub trait HighScoreStore {
    /// Stored best score, 0 when there is none
    fn load(&self) -> u32;

    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// Keeps the best score in a small text file
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/high_score` for this application, when the platform has one
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mouse_snake").map(|dirs| dirs.data_dir().join("high_score"))
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no stored high score");
                return 0;
            }
            Err(err) => {
                warn!(path = ?self.path, error = %err, "could not read high score");
                return 0;
            }
        };

        match contents.trim().parse::<u32>() {
            Ok(score) => score,
            Err(err) => {
                warn!(path = ?self.path, error = %err, "ignoring malformed high score");
                0
            }
        }
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| HighScoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        std::fs::write(&self.path, format!("{score}\n")).map_err(|source| {
            HighScoreError::Write {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(path = ?self.path, score, "high score saved");
        Ok(())
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    score: u32,
}

impl MemoryHighScoreStore {
    pub fn new(score: u32) -> Self {
        Self { score }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u32 {
        self.score
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.score = score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let store = FileHighScoreStore::new(dir.path().join("absent"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("high_score");
        let mut store = FileHighScoreStore::new(&path);

        store.save(120).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "120\n");
        assert_eq!(FileHighScoreStore::new(&path).load(), 120);
    }

    #[test]
    fn test_malformed_contents_are_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("high_score");

        for contents in ["", "abc", "-5", "12.5", "99999999999999"] {
            std::fs::write(&path, contents).unwrap();
            assert_eq!(FileHighScoreStore::new(&path).load(), 0, "{contents:?}");
        }
    }

    #[test]
    fn test_surrounding_whitespace_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("high_score");
        std::fs::write(&path, "  340 \n").unwrap();

        assert_eq!(FileHighScoreStore::new(&path).load(), 340);
    }

    #[test]
    fn test_directory_in_the_way() {
        let dir = TempDir::new().unwrap();
        let mut store = FileHighScoreStore::new(dir.path());

        // Reading a directory is not a score
        assert_eq!(store.load(), 0);
        assert!(matches!(store.save(10), Err(HighScoreError::Write { .. })));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryHighScoreStore::new(30);
        assert_eq!(store.load(), 30);
        store.save(50).unwrap();
        assert_eq!(store.load(), 50);
    }
}
