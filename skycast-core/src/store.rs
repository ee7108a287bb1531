use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use parking_lot::Mutex;
use std::{collections::HashMap, fs, io, path::PathBuf};

/// String key-value persistence, used for the recent-search list and the
/// unit preference.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key under the platform data directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store at the platform-specific data directory.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::at(dirs.data_dir().to_path_buf()))
    }

    /// Open the store rooted at an explicit directory.
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory: {}", self.root.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write store entry: {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove store entry: {}", path.display())),
        }
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_set_get_remove() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::at(dir.path().join("store"));

        assert_eq!(store.get("unit"), None);

        store.set("unit", "imperial").expect("set should succeed");
        assert_eq!(store.get("unit").as_deref(), Some("imperial"));

        store.set("unit", "metric").expect("overwrite should succeed");
        assert_eq!(store.get("unit").as_deref(), Some("metric"));

        store.remove("unit").expect("remove should succeed");
        assert_eq!(store.get("unit"), None);
    }

    #[test]
    fn file_store_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::at(dir.path().to_path_buf());

        assert!(store.remove("never_written").is_ok());
    }

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();

        store.set("k", "v").expect("set should succeed");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k").expect("remove should succeed");
        assert_eq!(store.get("k"), None);
    }
}
