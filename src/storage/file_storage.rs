//! The object store: live models keyed by `<TypeName>.<id>`, flushed to
//! and reloaded from one JSON file.
//!
//! One store is constructed at process start and handed to whoever needs
//! it. There is no locking; the backing file is assumed to belong to a
//! single process at a time.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, error, warn};

use crate::model::Model;
use crate::registry::TypeRegistry;
use crate::storage::codec;
use crate::storage::writer::write_atomic;
use crate::storage::{StorageConfig, StorageError};

/// Lifecycle of a [`FileStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed, `reload` not called yet.
    Uninitialized,
    /// `reload` has run (whatever its outcome).
    Ready,
}

/// Outcome of a successful [`FileStorage::reload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Whether the backing file existed.
    pub file_found: bool,
    /// Entries inserted into the live mapping.
    pub loaded: usize,
    /// Entries skipped because they could not be reconstructed.
    pub skipped: usize,
    /// Loaded entries whose stored key differs from the computed one.
    pub rekeyed: usize,
}

/// JSON-file backed object store.
#[derive(Debug)]
pub struct FileStorage {
    config: StorageConfig,
    registry: TypeRegistry,
    objects: BTreeMap<String, Model>,
    state: StoreState,
}

impl FileStorage {
    /// Creates an empty store over the configured file.
    ///
    /// Nothing is read until [`FileStorage::reload`] is called.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidConfig` if the configuration is
    /// rejected by [`StorageConfig::validate`].
    pub fn open(config: StorageConfig, registry: TypeRegistry) -> Result<Self, StorageError> {
        let config = config.validate()?;
        debug!(
            "opened store at {} ({} registered types)",
            config.file_path.display(),
            registry.len()
        );
        Ok(Self {
            config,
            registry,
            objects: BTreeMap::new(),
            state: StoreState::Uninitialized,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.config.file_path
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> StoreState {
        self.state
    }

    /// The registry used to resolve `__class__` tags.
    #[must_use]
    pub const fn classes(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The live mapping from storage key to model.
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, Model> {
        &self.objects
    }

    /// Mutable access to the live mapping.
    ///
    /// Callers may insert, mutate, or delete entries directly; nothing is
    /// persisted until [`FileStorage::save`]. Prefer [`FileStorage::add`]
    /// and [`FileStorage::remove`], which keep keys consistent.
    pub fn all_mut(&mut self) -> &mut BTreeMap<String, Model> {
        &mut self.objects
    }

    /// Inserts a model under its storage key, returning any model it
    /// replaced. Last write wins.
    pub fn add(&mut self, model: Model) -> Option<Model> {
        let key = model.storage_key();
        debug!("store add {key}");
        self.objects.insert(key, model)
    }

    /// Looks up a model by storage key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Model> {
        self.objects.get(key)
    }

    /// Looks up a model by storage key for mutation.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Model> {
        self.objects.get_mut(key)
    }

    /// Removes the model stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Model> {
        let removed = self.objects.remove(key);
        if removed.is_some() {
            debug!("store remove {key}");
        }
        removed
    }

    /// Number of live models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no model is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Writes every live model to the backing file, replacing it.
    ///
    /// The whole document is encoded in memory first and then swapped in
    /// atomically, so a failure leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Codec` on serialization failure or
    /// `StorageError::Io` if the file cannot be written.
    pub fn save(&self) -> Result<(), StorageError> {
        let bytes = codec::encode(&self.objects)?;
        let path = &self.config.file_path;
        write_atomic(path, &bytes, self.config.sync_on_write)
            .map_err(|e| StorageError::io(path, e))?;
        debug!(
            "saved {} objects ({} bytes) to {}",
            self.objects.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Refreshes `updated_at` of the model under `key`, then saves the
    /// whole store.
    ///
    /// Every call rewrites the file; there is no dirty tracking.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `key` is absent, or any error
    /// from [`FileStorage::save`].
    pub fn touch(&mut self, key: &str) -> Result<(), StorageError> {
        let model = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        model.mark_updated();
        self.save()
    }

    /// Loads the backing file into the live mapping.
    ///
    /// - A missing file is the first-run case: nothing changes, `Ok` is
    ///   returned.
    /// - A file that fails to decode leaves the mapping untouched and
    ///   returns `StorageError::Codec`.
    /// - Entries that cannot be reconstructed (not an object, unknown
    ///   `__class__`, bad id or timestamps) are skipped with a warning.
    /// - Entries are inserted under the key found in the file, even when
    ///   it disagrees with the model's own type and id.
    ///
    /// Existing entries with other keys are kept. The store is `Ready`
    /// afterwards in every case.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Codec` for a malformed file, or
    /// `StorageError::Io` if an existing file cannot be read.
    pub fn reload(&mut self) -> Result<ReloadReport, StorageError> {
        self.state = StoreState::Ready;
        let path = &self.config.file_path;

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no backing file at {}, starting empty", path.display());
                return Ok(ReloadReport::default());
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let records = codec::decode(&bytes).map_err(|e| {
            error!("failed to decode {}: {e}", path.display());
            StorageError::Codec(e)
        })?;

        let mut report = ReloadReport {
            file_found: true,
            ..ReloadReport::default()
        };
        let mut staged = Vec::with_capacity(records.len());
        for (key, value) in records {
            let serde_json::Value::Object(record) = value else {
                warn!("skipping entry '{key}': value is not a JSON object");
                report.skipped += 1;
                continue;
            };
            match Model::reconstruct(record, &self.registry) {
                Ok(model) => {
                    if model.storage_key() != key {
                        warn!(
                            "entry '{key}' does not match its content ({}); keeping stored key",
                            model.storage_key()
                        );
                        report.rekeyed += 1;
                    }
                    staged.push((key, model));
                }
                Err(e) => {
                    warn!("skipping entry '{key}': {e}");
                    report.skipped += 1;
                }
            }
        }

        report.loaded = staged.len();
        self.objects.extend(staged);
        debug!(
            "reloaded {} objects from {} ({} skipped)",
            report.loaded,
            path.display(),
            report.skipped
        );
        Ok(report)
    }
}
