use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous key-value persistence, the local-storage half of the client.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn store<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set(key, value)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageData {
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
    #[serde(default)]
    pub updated_at: String,
}

/// JSON file backed store. Every write goes to disk before the in-memory copy
/// is swapped, so a failed write leaves both sides on the previous state.
pub struct FileStore {
    storage_path: PathBuf,
    data: StorageData,
}

impl FileStore {
    pub const FILE_NAME: &'static str = "storage.json";

    pub fn new(data_dir: &Path) -> Self {
        Self {
            storage_path: data_dir.join(Self::FILE_NAME),
            data: StorageData::default(),
        }
    }

    /// Open the store under `data_dir`, reading any existing file.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let mut store = Self::new(data_dir);
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    pub fn initialize(&mut self) -> Result<(), StorageError> {
        if let Some(data_dir) = self.storage_path.parent() {
            fs::create_dir_all(data_dir)?;
        }

        if self.storage_path.exists() {
            let contents = fs::read_to_string(&self.storage_path)?;
            self.data = if contents.trim().is_empty() {
                StorageData::default()
            } else {
                match serde_json::from_str(&contents) {
                    Ok(data) => data,
                    Err(err) => {
                        let aside = self.storage_path.with_extension("corrupt");
                        tracing::warn!(
                            error = %err,
                            moved_to = %aside.display(),
                            "local storage is unreadable; starting empty"
                        );
                        fs::rename(&self.storage_path, &aside)?;
                        StorageData::default()
                    }
                }
            };
            tracing::debug!(path = %self.storage_path.display(), keys = self.data.entries.len(), "loaded local storage");
        }

        Ok(())
    }

    /// Write `data` using a temporary file and an atomic rename to avoid
    /// partial writes.
    fn write_snapshot(storage_path: &Path, data: &StorageData) -> Result<(), StorageError> {
        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = storage_path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        let content = serde_json::to_string_pretty(data)?;
        f.write_all(content.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, storage_path)?;
        Ok(())
    }

    fn commit(&mut self, mut next: StorageData) -> Result<(), StorageError> {
        next.updated_at = Utc::now().to_rfc3339();
        Self::write_snapshot(&self.storage_path, &next)?;
        self.data = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.data.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut next = self.data.clone();
        next.entries.insert(key.to_string(), value);
        self.commit(next)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.data.entries.contains_key(key) {
            return Ok(());
        }
        let mut next = self.data.clone();
        next.entries.remove(key);
        self.commit(next)
    }
}

/// In-memory store for tests. `failing()` builds one whose writes always
/// error, to exercise the no-drift path.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::other("storage is read-only")));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.remove(key);
        Ok(())
    }
}
