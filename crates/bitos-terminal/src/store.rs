//! Optional persistence of a session's working directory and history.

use std::fs;
use std::path::{Path, PathBuf};

use bitos_types::error::Result;
use serde::{Deserialize, Serialize};

/// The persisted part of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub cwd: String,
    #[serde(default)]
    pub history: Vec<String>,
}

/// Somewhere a session can be saved between runs.
pub trait SessionStore {
    /// The last saved session, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<SavedSession>>;

    fn save(&mut self, session: &SavedSession) -> Result<()>;
}

/// Keeps the saved session in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Option<SavedSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<SavedSession>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, session: &SavedSession) -> Result<()> {
        self.saved = Some(session.clone());
        Ok(())
    }
}

/// Stores the session as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<SavedSession>> {
        if !self.path.exists() {
            log::debug!("no saved session at {}", self.path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let saved = serde_json::from_str(&text)?;
        log::info!("restored session from {}", self.path.display());
        Ok(Some(saved))
    }

    fn save(&mut self, session: &SavedSession) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        log::debug!("saved session to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitos_types::error::ErrorKind;

    fn sample() -> SavedSession {
        SavedSession {
            cwd: "/var/log".into(),
            history: vec!["cd /var/log".into(), "ls".into()],
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn json_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn json_store_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/state/session.json"));
        store.save(&sample()).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(sample()));
    }

    #[test]
    fn json_store_corrupt_file_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(path).load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn history_defaults_when_absent() {
        let saved: SavedSession = serde_json::from_str(r#"{"cwd":"/tmp"}"#).unwrap();
        assert_eq!(saved.cwd, "/tmp");
        assert!(saved.history.is_empty());
    }
}
