use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;

/// Error type for slot access
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("could not read slot {key} at {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write slot {key} at {path}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        source: io::Error,
    },
}

/// A persistent key-value store holding one serialized document per key.
pub trait SlotStore {
    /// Returns `None` when nothing has been stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;
    /// Overwrites whatever was stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SlotError>;
}

/// Slots backed by `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct DirSlots {
    dir: PathBuf,
}

impl DirSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirSlots { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStore for DirSlots {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotError::Read {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.slot_path(key);
        atomic_write(&path, value.as_bytes()).map_err(|e| SlotError::Write {
            key: key.to_string(),
            path,
            source: e,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), SlotError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlotError::Write {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }
}

/// Slots held in memory only. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    values: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SlotError> {
        self.values.remove(key);
        Ok(())
    }
}
