//! JSON-file object store.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                  FileStorage                  │
//! │   BTreeMap<"<Type>.<id>", Model>  (in memory) │
//! ├───────────────────────┬───────────────────────┤
//! │  codec (encode/decode)│  TypeRegistry         │
//! ├───────────────────────┴───────────────────────┤
//! │  AtomicFileWriter  (temp file + fsync + rename)│
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The backing file is always read whole and rewritten whole.

mod codec;
mod file_storage;
mod writer;

pub use codec::{decode, encode, CodecError};
pub use file_storage::{FileStorage, ReloadReport, StoreState};
pub use writer::{write_atomic, AtomicFileWriter};

use std::path::PathBuf;

use thiserror::Error;

use crate::error::ModelError;

/// Default name of the backing file.
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be decoded.
    #[error("decode error: {0}")]
    Codec(#[from] CodecError),

    /// A model could not be built or mutated.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// No model is stored under the key.
    #[error("no instance stored under '{0}'")]
    NotFound(String),

    /// The configuration is unusable.
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration for the file store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path of the backing JSON file.
    pub file_path: PathBuf,
    /// Whether to fsync the file on every save (slower but safer).
    pub sync_on_write: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            sync_on_write: true,
        }
    }
}

impl StorageConfig {
    /// Creates a configuration for the given backing file.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Checks the configuration, returning it unchanged when usable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the path is empty, has no
    /// file name, or names an existing directory.
    pub fn validate(self) -> Result<Self, StorageError> {
        if self.file_path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig(
                "file_path must not be empty".to_string(),
            ));
        }
        if self.file_path.file_name().is_none() {
            return Err(StorageError::InvalidConfig(format!(
                "file_path '{}' has no file name",
                self.file_path.display()
            )));
        }
        if self.file_path.is_dir() {
            return Err(StorageError::InvalidConfig(format!(
                "file_path '{}' is a directory",
                self.file_path.display()
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.file_path, PathBuf::from("file.json"));
        assert!(config.sync_on_write);
    }

    #[test]
    fn test_validate_accepts_plain_file() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path().join("file.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let err = StorageConfig::new("").validate().unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_directory() {
        let dir = tempdir().unwrap();
        let err = StorageConfig::new(dir.path()).validate().unwrap_err();
        assert!(err.to_string().contains("is a directory"));
    }
}
