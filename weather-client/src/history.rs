//! Recent searches, most recent first, persisted as a JSON array under one fixed key.

use common::models::CitySuggestion;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

pub const HISTORY_KEY: &str = "recent_searches";
pub const MAX_RECENT: usize = 5;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// String key-value store the history is written to.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

pub struct RecentSearches {
    entries: Vec<CitySuggestion>,
    storage: Box<dyn Storage>,
}

impl RecentSearches {
    /// Load from storage. Missing or unreadable history starts out empty.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let mut entries = match storage.load(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<CitySuggestion>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable search history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read search history");
                Vec::new()
            }
        };
        entries.truncate(MAX_RECENT);

        Self { entries, storage }
    }

    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    pub fn entries(&self) -> &[CitySuggestion] {
        &self.entries
    }

    /// Put `city` first; an entry with the same id moves rather than duplicates.
    pub fn add(&mut self, city: CitySuggestion) {
        self.entries.retain(|c| c.id != city.id);
        self.entries.insert(0, city);
        self.entries.truncate(MAX_RECENT);
        self.persist();
    }

    pub fn remove(&mut self, id: i64) {
        let before = self.entries.len();
        self.entries.retain(|c| c.id != id);
        if self.entries.len() != before {
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.save(HISTORY_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Could not save search history");
        }
    }
}
