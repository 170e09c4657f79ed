//! JSONL-backed roster store.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::models::RosterEntry;

use super::{StorageConfig, StorageError};

/// Keyed store of registered players.
///
/// Entries are unique by nickname and by upstream player id; writing an
/// entry that matches an existing one on either key updates it in place.
/// Mutations rewrite the whole file.
pub struct RosterStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RosterStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.roster_path())
    }

    fn read_all(&self) -> Result<Vec<RosterEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", line_num, self.path, e);
                }
            }
        }

        debug!("Read {} roster entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }

    fn write_all(&self, entries: &[RosterEntry]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()?;
        debug!("Wrote {} roster entries to {:?}", entries.len(), self.path);
        Ok(())
    }

    /// All registered players, ordered by elo descending.
    pub fn list(&self) -> Result<Vec<RosterEntry>, StorageError> {
        let _guard = self.lock.lock().expect("roster lock poisoned");
        let mut entries = self.read_all()?;
        entries.sort_by(|a, b| b.elo.cmp(&a.elo));
        Ok(entries)
    }

    /// Look up one player by nickname, case-insensitively.
    pub fn get(&self, nickname: &str) -> Result<Option<RosterEntry>, StorageError> {
        let _guard = self.lock.lock().expect("roster lock poisoned");
        let entries = self.read_all()?;
        Ok(entries
            .into_iter()
            .find(|e| e.nickname.eq_ignore_ascii_case(nickname)))
    }

    /// Insert a new entry, or update the existing one matching on
    /// nickname or player id.
    pub fn upsert(&self, entry: RosterEntry) -> Result<(), StorageError> {
        let _guard = self.lock.lock().expect("roster lock poisoned");
        let mut entries = self.read_all()?;

        let existing = entries.iter_mut().find(|e| {
            e.nickname.eq_ignore_ascii_case(&entry.nickname) || e.player_id == entry.player_id
        });

        match existing {
            Some(slot) => *slot = entry,
            None => entries.push(entry),
        }

        self.write_all(&entries)
    }

    /// Remove a player by nickname; `false` when no entry matched.
    pub fn delete(&self, nickname: &str) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().expect("roster lock poisoned");
        let mut entries = self.read_all()?;
        let before = entries.len();

        entries.retain(|e| !e.nickname.eq_ignore_ascii_case(nickname));

        if entries.len() == before {
            return Ok(false);
        }

        self.write_all(&entries)?;
        Ok(true)
    }
}
