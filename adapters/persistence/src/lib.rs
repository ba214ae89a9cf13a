#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-score persistence collaborator for Color Lines.
//!
//! The only state that survives a session is a single best-score scalar,
//! stored as a small TOML document. Hosts read it at startup and offer the
//! final score of each finished game; the file is overwritten only when the
//! score improves.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    best_score: u32,
}

/// File-backed store holding the single persisted best score.
#[derive(Clone, Debug)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    /// Creates a store backed by the provided file path. The file is not
    /// touched until the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted best score, defaulting to zero when no score has
    /// been recorded yet.
    pub fn load(&self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading high score file {}", self.path.display()))?;
        let file: HighScoreFile = toml::from_str(&text)
            .with_context(|| format!("parsing high score file {}", self.path.display()))?;
        Ok(file.best_score)
    }

    /// Offers a final score; persists it and returns `true` only when it
    /// beats the stored best.
    pub fn record(&self, score: u32) -> Result<bool> {
        let best = self.load()?;
        if score <= best {
            return Ok(false);
        }

        let text = toml::to_string(&HighScoreFile { best_score: score })
            .context("serializing high score")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(&self.path, text)
            .with_context(|| format!("writing high score file {}", self.path.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(name: &str) -> HighScoreStore {
        let mut path = std::env::temp_dir();
        path.push(format!("color-lines-{}-{}.toml", name, std::process::id()));
        let _ = fs::remove_file(&path);
        HighScoreStore::new(path)
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let store = scratch_store("missing");
        assert_eq!(store.load().expect("load"), 0);
    }

    #[test]
    fn improved_score_is_persisted() {
        let store = scratch_store("improved");

        assert!(store.record(120).expect("record"));
        assert_eq!(store.load().expect("load"), 120);

        assert!(store.record(300).expect("record"));
        assert_eq!(store.load().expect("load"), 300);

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn lower_or_equal_score_leaves_the_best_untouched() {
        let store = scratch_store("kept");

        assert!(store.record(50).expect("record"));
        assert!(!store.record(50).expect("record"));
        assert!(!store.record(10).expect("record"));
        assert_eq!(store.load().expect("load"), 50);

        let _ = fs::remove_file(store.path());
    }
}
