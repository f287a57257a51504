//! Model instances and identity management.
//!
//! A [`Model`] is the unit the object store persists: an immutable
//! identifier, two timestamps, the name of its concrete type, and any
//! number of free-form attributes.

use std::fmt;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ModelError;
use crate::registry::{TypeRegistry, BASE_MODEL};
use crate::time;

/// Plain-mapping form of a model, as stored in the backing file.
pub type Record = serde_json::Map<String, Value>;

/// Field carrying the concrete type name in a [`Record`].
pub const CLASS_KEY: &str = "__class__";

/// Attribute names owned by the model itself.
pub const RESERVED_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", CLASS_KEY];

/// Builds the storage key `<TypeName>.<id>` addressing one model.
#[must_use]
pub fn storage_key(class_name: &str, id: &str) -> String {
    format!("{class_name}.{id}")
}

/// Opaque, immutable model identifier.
///
/// Fresh identifiers are hyphenated UUID v4 strings. Identifiers loaded
/// from disk are kept verbatim, whatever their shape.
///
/// # Examples
///
/// ```
/// use hbnb::ModelId;
///
/// let id = ModelId::generate();
/// assert_eq!(id.as_str().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted object.
///
/// Two models are equal when every field matches, including timestamps
/// and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    class_name: String,
    id: ModelId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attributes: Record,
}

impl Model {
    /// Creates a fresh model of the given type with a new id and both
    /// timestamps set to now.
    ///
    /// Prefer [`crate::registry::ModelClass::instantiate`], which also
    /// applies the type's default attributes.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        let now = time::now();
        Self {
            class_name: class_name.into(),
            id: ModelId::generate(),
            created_at: now,
            updated_at: now,
            attributes: Record::new(),
        }
    }

    /// Creates a fresh `BaseModel`.
    #[must_use]
    pub fn base() -> Self {
        Self::new(BASE_MODEL)
    }

    /// Rebuilds a model from a stored record, resolving its concrete type
    /// through `registry`.
    ///
    /// A record without a `__class__` tag is rebuilt as `BaseModel`.
    ///
    /// # Errors
    ///
    /// - `ModelError::UnknownType` if the tag names no registered type.
    /// - `ModelError::InvalidField` if the tag or the id is not a string.
    /// - `ModelError::InvalidTimestamp` if a timestamp cannot be parsed.
    pub fn reconstruct(record: Record, registry: &TypeRegistry) -> Result<Self, ModelError> {
        let class = match record.get(CLASS_KEY) {
            None => registry.resolve(BASE_MODEL),
            Some(Value::String(name)) => registry.resolve(name),
            Some(_) => {
                return Err(ModelError::InvalidField {
                    field: CLASS_KEY.to_string(),
                })
            }
        };
        let class = class.ok_or_else(|| ModelError::UnknownType {
            name: record
                .get(CLASS_KEY)
                .and_then(Value::as_str)
                .unwrap_or(BASE_MODEL)
                .to_string(),
        })?;
        class.reconstruct(record)
    }

    /// Rebuilds a model of a known type from a stored record.
    ///
    /// Timestamps are parsed, every other key is copied verbatim, and the
    /// `__class__` tag is dropped. Missing id or timestamps fall back to
    /// fresh values.
    ///
    /// # Errors
    ///
    /// See [`Model::reconstruct`].
    pub fn from_record(
        class_name: impl Into<String>,
        mut record: Record,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(class_name);
        record.remove(CLASS_KEY);

        if let Some(id) = record.remove("id") {
            match id {
                Value::String(id) => model.id = ModelId(id),
                _ => {
                    return Err(ModelError::InvalidField {
                        field: "id".to_string(),
                    })
                }
            }
        }
        if let Some(value) = record.remove("created_at") {
            model.created_at = parse_timestamp("created_at", &value)?;
        }
        if let Some(value) = record.remove("updated_at") {
            model.updated_at = parse_timestamp("updated_at", &value)?;
        }

        model.attributes = record;
        Ok(model)
    }

    /// Returns the concrete type name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the model identifier.
    #[must_use]
    pub const fn id(&self) -> &ModelId {
        &self.id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the free-form attributes (without id, timestamps, or tag).
    #[must_use]
    pub const fn attributes(&self) -> &Record {
        &self.attributes
    }

    /// Returns a single free-form attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets a free-form attribute, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ReservedAttribute` for `id`, `created_at`,
    /// `updated_at` and `__class__`.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            return Err(ModelError::ReservedAttribute { name });
        }
        self.attributes.insert(name, value.into());
        Ok(())
    }

    /// Inserts an attribute whose name is already known not to be reserved.
    pub(crate) fn insert_attribute(&mut self, name: String, value: Value) {
        self.attributes.insert(name, value);
    }

    /// Removes a free-form attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// Refreshes `updated_at` to the current time.
    ///
    /// This does not persist anything; use
    /// [`crate::storage::FileStorage::touch`] to refresh and flush in one
    /// step.
    pub fn mark_updated(&mut self) {
        self.updated_at = time::now();
    }

    /// Returns the key addressing this model in the object store.
    #[must_use]
    pub fn storage_key(&self) -> String {
        storage_key(&self.class_name, self.id.as_str())
    }

    /// Serializes the model to its plain-mapping form.
    ///
    /// The result is the exact inverse of [`Model::reconstruct`].
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = self.attributes.clone();
        record.insert("id".to_string(), Value::String(self.id.0.clone()));
        record.insert(
            "created_at".to_string(),
            Value::String(time::format(&self.created_at)),
        );
        record.insert(
            "updated_at".to_string(),
            Value::String(time::format(&self.updated_at)),
        );
        record.insert(CLASS_KEY.to_string(), Value::String(self.class_name.clone()));
        record
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

fn parse_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>, ModelError> {
    match value {
        Value::String(s) => time::parse(field, s),
        _ => Err(ModelError::InvalidField {
            field: field.to_string(),
        }),
    }
}

/// Human-readable form: `[<Type>] (<id>) {'id': ..., 'name': 'Betty'}`.
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push('{');
        push_entry(&mut out, "id", &Value::String(self.id.0.clone()));
        out.push_str(", ");
        push_entry(&mut out, "created_at", &Value::String(time::format(&self.created_at)));
        out.push_str(", ");
        push_entry(&mut out, "updated_at", &Value::String(time::format(&self.updated_at)));
        for (name, value) in &self.attributes {
            out.push_str(", ");
            push_entry(&mut out, name, value);
        }
        out.push('}');
        write!(f, "[{}] ({}) {}", self.class_name, self.id, out)
    }
}

fn push_entry(out: &mut String, name: &str, value: &Value) {
    push_quoted(out, name);
    out.push_str(": ");
    push_value(out, value);
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => push_quoted(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_entry(out, k, v);
            }
            out.push('}');
        }
        other => {
            let _ = write!(out, "{other}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        TypeRegistry::builtin()
    }

    #[test]
    fn test_model_id_generation() {
        let id1 = ModelId::generate();
        let id2 = ModelId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
        assert!(id1.as_str().contains('-'));
    }

    #[test]
    fn test_new_model_timestamps_match() {
        let model = Model::base();
        assert_eq!(model.class_name(), "BaseModel");
        assert_eq!(model.created_at(), model.updated_at());
        assert!(model.attributes().is_empty());
    }

    #[test]
    fn test_mark_updated_moves_forward() {
        let mut model = Model::base();
        let before = model.updated_at();
        std::thread::sleep(std::time::Duration::from_millis(2));
        model.mark_updated();
        assert!(model.updated_at() > before);
        assert_eq!(model.created_at(), before);
    }

    #[test]
    fn test_storage_key() {
        let model = Model::base();
        assert_eq!(model.storage_key(), format!("BaseModel.{}", model.id()));
    }

    #[test]
    fn test_to_record_fields() {
        let mut model = Model::base();
        model.set_attribute("name", "My First Model").unwrap();
        model.set_attribute("my_number", 89).unwrap();

        let record = model.to_record();
        assert_eq!(record["__class__"], json!("BaseModel"));
        assert_eq!(record["id"], json!(model.id().as_str()));
        assert_eq!(record["name"], json!("My First Model"));
        assert_eq!(record["my_number"], json!(89));
        assert_eq!(
            record["created_at"],
            json!(time::format(&model.created_at()))
        );
    }

    #[test]
    fn test_reconstruct_is_inverse_of_to_record() {
        let mut model = Model::base();
        model.set_attribute("name", "Betty").unwrap();
        model.set_attribute("tags", json!(["a", "b"])).unwrap();
        model.set_attribute("nested", json!({"k": 1.5, "ok": true})).unwrap();

        let rebuilt = Model::reconstruct(model.to_record(), &registry()).unwrap();
        assert_eq!(rebuilt, model);
    }

    #[test]
    fn test_reconstruct_without_class_tag_is_base_model() {
        let mut record = Record::new();
        record.insert("id".to_string(), json!("abc"));
        record.insert("created_at".to_string(), json!("2017-09-28T21:05:54.119427"));
        record.insert("updated_at".to_string(), json!("2017-09-28T21:05:54.119572"));

        let model = Model::reconstruct(record, &registry()).unwrap();
        assert_eq!(model.class_name(), "BaseModel");
        assert_eq!(model.id().as_str(), "abc");
        assert_eq!(time::format(&model.updated_at()), "2017-09-28T21:05:54.119572");
    }

    #[test]
    fn test_reconstruct_unknown_class_fails() {
        let mut record = Model::base().to_record();
        record.insert(CLASS_KEY.to_string(), json!("Ghost"));

        let err = Model::reconstruct(record, &registry()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownType { ref name } if name == "Ghost"));
    }

    #[test]
    fn test_reconstruct_rejects_non_string_id() {
        let mut record = Model::base().to_record();
        record.insert("id".to_string(), json!(42));

        let err = Model::reconstruct(record, &registry()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidField { ref field } if field == "id"));
    }

    #[test]
    fn test_reconstruct_rejects_bad_timestamp() {
        let mut record = Model::base().to_record();
        record.insert("created_at".to_string(), json!("not a date"));

        let err = Model::reconstruct(record, &registry()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_reconstruct_fills_missing_fields() {
        let mut record = Record::new();
        record.insert("name".to_string(), json!("only a name"));

        let model = Model::reconstruct(record, &registry()).unwrap();
        assert_eq!(model.id().as_str().len(), 36);
        assert_eq!(model.attribute("name"), Some(&json!("only a name")));
    }

    #[test]
    fn test_reserved_attributes_rejected() {
        let mut model = Model::base();
        for name in RESERVED_ATTRIBUTES {
            let err = model.set_attribute(name, "x").unwrap_err();
            assert!(matches!(err, ModelError::ReservedAttribute { .. }));
        }
    }

    #[test]
    fn test_remove_attribute() {
        let mut model = Model::base();
        model.set_attribute("name", "x").unwrap();
        assert_eq!(model.remove_attribute("name"), Some(json!("x")));
        assert!(model.attribute("name").is_none());
    }

    #[test]
    fn test_display_format() {
        let mut model = Model::base();
        model.set_attribute("name", "Betty").unwrap();
        let rendered = model.to_string();

        assert!(rendered.starts_with(&format!("[BaseModel] ({}) {{", model.id())));
        assert!(rendered.contains(&format!("'id': '{}'", model.id())));
        assert!(rendered.contains("'name': 'Betty'"));
        assert!(rendered.ends_with('}'));
    }

    #[test]
    fn test_display_escapes_and_nests() {
        let mut model = Model::base();
        model.set_attribute("quote", "it's").unwrap();
        model.set_attribute("list", json!([1, "two", null])).unwrap();
        let rendered = model.to_string();

        assert!(rendered.contains(r"'quote': 'it\'s'"));
        assert!(rendered.contains("'list': [1, 'two', null]"));
    }

    #[test]
    fn test_serialize_matches_record() {
        let model = Model::base();
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json, Value::Object(model.to_record()));
    }
}
