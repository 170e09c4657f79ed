//! Filesystem persistence for the player roster.
//!
//! The roster is a single JSONL file under the data directory — one line
//! per registered player. It is the collaborator the core pipeline reads
//! player ids and nicknames from; registration itself stays outside the
//! aggregation core.

use std::path::PathBuf;
use thiserror::Error;

mod roster;

pub use roster::RosterStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join("roster.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
