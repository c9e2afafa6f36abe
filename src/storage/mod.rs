// ============================================================================
// Module : storage
// ============================================================================
// Local key-value persistence: one JSON file per logical record under the
// per-user data directory. Two records exist today, the current session and
// the selected fund list.
//
// Reads are forgiving: a missing or unreadable record comes back as None so
// a corrupt file never blocks startup. Writes are last-write-wins with no
// coordination across processes.
// ============================================================================

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Storage key for the current user session.
pub const SESSION_KEY: &str = "session";
/// Storage key for the selected fund list.
pub const SELECTED_FUNDS_KEY: &str = "selected_funds";

/// File-backed JSON key-value store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Opens the store at the default per-user location
    /// (e.g. `~/.local/share/navscope` on Linux).
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("Could not determine the user data directory")?
            .join("navscope");
        Self::open(dir)
    }

    /// Opens a store rooted at an explicit directory (used by tests).
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        debug!(dir = %dir.display(), "Local store opened");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads and deserializes a record. Absent or unreadable -> None.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return None,
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable record");
                None
            }
        }
    }

    /// Serializes and writes a record, replacing any previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.path_for(key);
        let text = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize record '{}'", key))?;
        fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(key, "Record persisted");
        Ok(())
    }

    /// Deletes a record; deleting an absent record is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
