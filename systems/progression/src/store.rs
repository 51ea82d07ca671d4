//! Backing stores for persisted progress values.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::ProgressKey;

/// Errors raised while loading or saving progress.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform exposes no per-user data directory.
    #[error("no local data directory is available on this platform")]
    NoDataDirectory,
    /// Reading or writing the progress file failed.
    #[error("progress file {path} could not be accessed")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The progress file does not hold a flat map of integers.
    #[error("progress file {path} is malformed")]
    Malformed {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Flat map of progress keys to integers. Absent keys read as zero.
pub trait ProgressStore {
    /// Reads the value stored under `key`.
    fn read(&self, key: ProgressKey) -> i64;

    /// Stores `value` under `key`.
    fn write(&mut self, key: ProgressKey, value: i64);

    /// Deletes `key` so that it reads as zero again.
    fn remove(&mut self, key: ProgressKey);

    /// Makes previous writes durable.
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// Store that lives only as long as the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, i64>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn read(&self, key: ProgressKey) -> i64 {
        self.values.get(key.as_str()).copied().unwrap_or(0)
    }

    fn write(&mut self, key: ProgressKey, value: i64) {
        let _ = self.values.insert(key.as_str().to_owned(), value);
    }

    fn remove(&mut self, key: ProgressKey) {
        let _ = self.values.remove(key.as_str());
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store persisted as a JSON object on disk.
///
/// Writes are buffered in memory and reach the file on [`ProgressStore::flush`].
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Default location of the progress file in the user's data directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        dirs::data_local_dir()
            .map(|dir| dir.join("starfall").join("progress.json"))
            .ok_or(StoreError::NoDataDirectory)
    }

    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
                    path: path.clone(),
                    source,
                })?
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no progress file found, starting fresh");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), keys = values.len(), "progress loaded");
        Ok(Self { path, values })
    }

    /// File backing the store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileStore {
    fn read(&self, key: ProgressKey) -> i64 {
        self.values.get(key.as_str()).copied().unwrap_or(0)
    }

    fn write(&mut self, key: ProgressKey, value: i64) {
        let _ = self.values.insert(key.as_str().to_owned(), value);
    }

    fn remove(&mut self, key: ProgressKey) {
        let _ = self.values.remove(key.as_str());
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.values).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "progress saved");
        Ok(())
    }
}
