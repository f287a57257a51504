//! # hbnb - a JSON-file object store
//!
//! Models identified by UUID live in memory, keyed by `<TypeName>.<id>`,
//! and are written to and read back from a single JSON file. A small line
//! interpreter drives create/show/destroy/all/update on top of the store.
//!
//! ## Core Concepts
//!
//! - **Model**: identity, two timestamps, and free-form attributes
//! - **TypeRegistry**: resolves the `__class__` tag of a stored record
//! - **FileStorage**: the live mapping plus `save`/`reload`
//! - **codec**: pure encode/decode of the backing file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hbnb::{FileStorage, Model, StorageConfig, TypeRegistry};
//!
//! let mut storage = FileStorage::open(StorageConfig::default(), TypeRegistry::builtin())?;
//! storage.reload()?;
//!
//! let mut model = Model::base();
//! model.set_attribute("name", "Betty")?;
//! storage.add(model);
//! storage.save()?;
//! # Ok::<(), hbnb::HbnbError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod console;
pub mod error;
pub mod logging;
pub mod model;
pub mod registry;
pub mod storage;
pub mod time;

pub use console::{Command, Console, Flow};
pub use error::{CommandError, HbnbError, HbnbResult, ModelError};
pub use model::{storage_key, Model, ModelId, Record};
pub use registry::{ModelClass, TypeRegistry, BASE_MODEL};
pub use storage::{
    CodecError, FileStorage, ReloadReport, StorageConfig, StorageError, StoreState,
};
