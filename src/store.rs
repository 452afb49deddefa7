// src/store.rs
use crate::error::AppError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable string key-value storage, the desk's only data tier.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove_item(&mut self, key: &str) -> Result<(), AppError>;
}

/// Keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key);
        // Staged write: the record is replaced whole or not at all.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        debug!("Persisted {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Reads from an inner [`MemoryStore`] and refuses every write.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct ReadOnlyStore {
    pub(crate) inner: MemoryStore,
}

#[cfg(test)]
impl KeyValueStore for ReadOnlyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, _value: &str) -> Result<(), AppError> {
        Err(std::io::Error::new(ErrorKind::PermissionDenied, format!("{} is read-only", key)).into())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        Err(std::io::Error::new(ErrorKind::PermissionDenied, format!("{} is read-only", key)).into())
    }
}
