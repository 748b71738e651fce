use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::errors::{WalletError, WalletResult};

/// String key-value storage with local-storage semantics: values are opaque
/// strings and a missing key is distinct from an empty value.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> WalletResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> WalletResult<()>;
}

/// All items kept in a single JSON object file, rewritten atomically on every
/// `set_item`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_items(&self) -> WalletResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            WalletError::StorageError(format!(
                "Storage file {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> WalletResult<()> {
        let serialized = serde_json::to_vec_pretty(items)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("new");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> WalletResult<Option<String>> {
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> WalletResult<()> {
        let _guard = self.write_lock.lock();
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }
}

/// In-memory storage, useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> WalletResult<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> WalletResult<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
