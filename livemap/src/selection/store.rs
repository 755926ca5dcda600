//! Persistence for the line selection.
//!
//! The selection survives restarts as a JSON array of tokens under a
//! versioned key. Failures are never fatal: loads fall back to the
//! unrestricted default and saves just log.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::SelectionState;

/// Versioned storage key. Bump when the token format changes.
pub const STORAGE_KEY: &str = "selected-lines.v5";

/// Errors from the selection store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("selection store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("selection store contained invalid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key-value collaborator holding the persisted selection tokens.
pub trait SelectionStore: Send {
    /// Load the stored token array, `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<Vec<String>>, StoreError>;

    /// Replace the stored token array.
    fn save(&mut self, tokens: &[String]) -> Result<(), StoreError>;
}

/// File-backed store writing the token array as JSON.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The platform default location, under the user data directory.
    ///
    /// Returns `None` when no data directory can be determined.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("livemap").join(format!("{STORAGE_KEY}.json"))))
    }

    /// Path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&mut self, tokens: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(tokens)?)?;
        Ok(())
    }
}

/// In-memory store for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: Option<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with tokens.
    pub fn with_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens: Some(tokens),
        }
    }
}

impl SelectionStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.tokens.clone())
    }

    fn save(&mut self, tokens: &[String]) -> Result<(), StoreError> {
        self.tokens = Some(tokens.to_vec());
        Ok(())
    }
}

/// Load the selection from a store, failing soft to the default.
pub(crate) fn load_or_default(store: &dyn SelectionStore) -> SelectionState {
    match store.load() {
        Ok(Some(tokens)) => SelectionState::from_tokens(tokens),
        Ok(None) => SelectionState::default(),
        Err(e) => {
            warn!(error = %e, "Failed to load persisted selection, showing all lines");
            SelectionState::default()
        }
    }
}

/// Persist the selection, logging on failure.
pub(crate) fn save_or_log(store: &mut dyn SelectionStore, selection: &SelectionState) {
    if let Err(e) = store.save(&selection.tokens()) {
        warn!(error = %e, "Failed to persist selection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested").join("selection.json"));

        assert!(store.load().unwrap().is_none());

        let tokens = vec!["14".to_string(), "__BUS__".to_string()];
        store.save(&tokens).unwrap();
        assert_eq!(store.load().unwrap(), Some(tokens));
    }

    #[test]
    fn test_file_store_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Format(_))));
    }

    #[test]
    fn test_load_or_default_fails_soft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        fs::write(&path, "{broken").unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(load_or_default(&store), SelectionState::All);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&["__NONE__".to_string()]).unwrap();
        assert_eq!(
            SelectionState::from_tokens(store.load().unwrap().unwrap()),
            SelectionState::None
        );
    }
}
