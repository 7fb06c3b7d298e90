//! String-keyed persistent storage
//!
//! A small stand-in for browser local storage: values are strings, keys are
//! strings, and the whole store is a single JSON object on disk.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage quota exceeded ({used} of {limit} bytes)")]
    QuotaExceeded { used: usize, limit: usize },
}

pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// JSON-object file backend
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/minichat/storage.json`, or a relative fallback when the
    /// platform has no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join("minichat"))
            .unwrap_or_else(|| PathBuf::from(".minichat"))
            .join("storage.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Serialize(e)) => {
                warn!("discarding unreadable store {}: {}", self.path.display(), e);
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling file first so a crash mid-write leaves the old store intact
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process backend with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            values: HashMap::new(),
            quota: Some(limit),
        }
    }

    fn used_with(&self, key: &str, value: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let used = self.used_with(key, value);
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nope.json"));
        assert!(storage.get("chat.history").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested/storage.json"));
        storage.set("chat.history", "[]").unwrap();
        storage.set("chat.model", "gpt-4o").unwrap();

        let reopened = FileStorage::new(storage.path().to_path_buf());
        assert_eq!(reopened.get("chat.history").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("chat.model").unwrap().as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_file_storage_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(path);
        assert!(matches!(storage.get("k"), Err(StorageError::Serialize(_))));
    }

    #[test]
    fn test_file_storage_set_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut storage = FileStorage::new(&path);
        storage.set("chat.model", "gpt-4o").unwrap();

        let reopened = FileStorage::new(path);
        assert_eq!(reopened.get("chat.model").unwrap().as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_quota(16);
        storage.set("k", "short").unwrap();
        let err = storage.set("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 16, .. }));
        // Failed write leaves the previous value in place
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("short"));
    }
}
