//! Type registry: maps type names to the classes that build them.
//!
//! The `__class__` tag in a stored record is resolved here, so adding a
//! model type only requires registering one [`ModelClass`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ModelError;
use crate::model::{Model, Record};

/// Name of the base model type.
pub const BASE_MODEL: &str = "BaseModel";

/// A constructible model type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelClass {
    name: String,
    defaults: Record,
}

impl ModelClass {
    /// Creates a class with no default attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Record::new(),
        }
    }

    /// Adds a default attribute applied to every instance of this class.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a fresh instance with a new id and the class defaults.
    #[must_use]
    pub fn instantiate(&self) -> Model {
        let mut model = Model::new(self.name.clone());
        self.apply_defaults(&mut model);
        model
    }

    /// Builds an instance from a stored record.
    ///
    /// Stored attributes win over class defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`Model::from_record`] failures.
    pub fn reconstruct(&self, record: Record) -> Result<Model, ModelError> {
        let mut model = Model::from_record(self.name.clone(), record)?;
        self.apply_defaults(&mut model);
        Ok(model)
    }

    fn apply_defaults(&self, model: &mut Model) {
        for (name, value) in &self.defaults {
            if model.attribute(name).is_none() {
                model.insert_attribute(name.clone(), value.clone());
            }
        }
    }
}

/// Mapping from type name to [`ModelClass`].
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    classes: BTreeMap<String, ModelClass>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in type.
    #[must_use]
    pub fn builtin() -> Self {
        let classes = [ModelClass::new(BASE_MODEL)]
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
        Self { classes }
    }

    /// Registers a class, replacing any class with the same name.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ReservedAttribute` if a default attribute uses
    /// a reserved name.
    pub fn register(&mut self, class: ModelClass) -> Result<(), ModelError> {
        if let Some(name) = class
            .defaults
            .keys()
            .find(|k| crate::model::RESERVED_ATTRIBUTES.contains(&k.as_str()))
        {
            return Err(ModelError::ReservedAttribute { name: name.clone() });
        }
        log::debug!("registered model type {}", class.name);
        self.classes.insert(class.name.clone(), class);
        Ok(())
    }

    /// Resolves a type name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ModelClass> {
        self.classes.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
