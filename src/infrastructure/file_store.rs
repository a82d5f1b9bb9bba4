//! File-backed key-value store.
//!
//! Each key lives in its own `<data_dir>/<key>.json` file. Writes go to
//! `<key>.json.tmp` first, are fsynced, then renamed over the real file and
//! the directory is fsynced, so a reader sees either the old value or the new
//! one and never a torn write.

use crate::application::key_value_store::KeyValueStore;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write_atomic(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.data_dir).map_err(io_err)?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .map_err(io_err)?;
            file.write_all(value.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }

        std::fs::rename(&tmp_path, &path).map_err(io_err)?;
        fsync_dir(&self.data_dir).map_err(io_err)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => fsync_dir(&self.data_dir).map_err(|source| StorageError::Io { path, source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        Ok(self.write_atomic(key, value)?)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        Ok(self.delete(key)?)
    }
}

/// Directory entries only become durable once the directory itself is synced.
fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absent_key_reads_none() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert_eq!(store.get("evRangeData").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        store.set("evRangeData", r#"{"legs":[]}"#).unwrap();
        assert_eq!(store.get("evRangeData").unwrap().as_deref(), Some(r#"{"legs":[]}"#));
        assert!(dir.path().join("nested/evRangeData.json").exists());
        assert!(!dir.path().join("nested/evRangeData.json.tmp").exists());

        store.set("evRangeData", "{}").unwrap();
        assert_eq!(store.get("evRangeData").unwrap().as_deref(), Some("{}"));

        store.remove("evRangeData").unwrap();
        assert_eq!(store.get("evRangeData").unwrap(), None);
        assert!(!dir.path().join("nested/evRangeData.json").exists());
    }

    #[test]
    fn test_remove_absent_key_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.remove("evRangeData").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
