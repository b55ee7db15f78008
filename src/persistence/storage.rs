//! Key-value blob stores the adapter writes snapshots into.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::PersistenceError;

/// A string key-value store.
///
/// Mirrors the browser `Storage` interface: one string blob per key.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory store with an optional byte quota, used by tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the stored bytes would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(PersistenceError::Write(format!(
                    "quota exceeded ({needed} > {quota} bytes)"
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `{key}.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`. Path separators in the key are replaced.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The browser's `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Result<Self, PersistenceError> {
        let window = web_sys::window()
            .ok_or_else(|| PersistenceError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| PersistenceError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::Read(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Write(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistenceError::Write(format!("{e:?}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_quota() {
        let mut storage = MemoryStorage::with_quota(16);
        assert!(storage.set("k", "short").is_ok());
        assert!(matches!(
            storage.set("k", "a value that does not fit"),
            Err(PersistenceError::Write(_))
        ));
        // the failed write left the previous value in place
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("cctv_proposal_data").unwrap(), None);
        storage.set("cctv_proposal_data", "{}").unwrap();
        assert_eq!(
            storage.get("cctv_proposal_data").unwrap().as_deref(),
            Some("{}")
        );
        storage.remove("cctv_proposal_data").unwrap();
        storage.remove("cctv_proposal_data").unwrap();
        assert_eq!(storage.get("cctv_proposal_data").unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitizes_key() {
        let storage = FileStorage::new("/tmp/x");
        assert!(storage.path_for("a/b").ends_with("a_b.json"));
    }
}
