use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Best score kept as a single integer in a text file.
///
/// Failures never reach the caller: a missing or unreadable file counts as 0,
/// and a failed write is only logged.
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(text) => text.trim().parse().unwrap_or_else(|err| {
                warn!(path = %self.path.display(), %err, "ignoring corrupt high score");
                0
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read high score");
                0
            }
        }
    }

    /// Stores `score` if it beats the stored value. Returns whether it did.
    pub fn record(&self, score: u32) -> bool {
        if score <= self.load() {
            return false;
        }
        match fs::write(&self.path, score.to_string()) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to save high score");
                false
            }
        }
    }
}
