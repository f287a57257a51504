//! JSON codec for the backing file.
//!
//! The file is a single JSON object: keys are storage keys
//! (`<TypeName>.<id>`), values are model records tagged with `__class__`.
//! Both directions are pure; no file access happens here.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::model::{Model, Record};

/// Errors produced while decoding the backing file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input is not valid JSON.
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Top-level value is valid JSON but not an object.
    #[error("top-level value is not a JSON object")]
    NotAnObject,
}

/// Serializes every model into one JSON document.
///
/// Keys are written in sorted order. All records are built in memory
/// before any byte is produced.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if serialization fails.
pub fn encode(objects: &BTreeMap<String, Model>) -> Result<Vec<u8>, CodecError> {
    let records: BTreeMap<&str, Record> = objects
        .iter()
        .map(|(key, model)| (key.as_str(), model.to_record()))
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

/// Parses the backing file into entry values keyed by storage key.
///
/// Entry values are returned as found; the caller decides what to do with
/// values that are not records.
///
/// # Errors
///
/// - `CodecError::Malformed` if the bytes are not valid JSON.
/// - `CodecError::NotAnObject` if the document is not a JSON object.
pub fn decode(bytes: &[u8]) -> Result<BTreeMap<String, Value>, CodecError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(entries) = value else {
        return Err(CodecError::NotAnObject);
    };
    Ok(entries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn objects(n: usize) -> BTreeMap<String, Model> {
        (0..n)
            .map(|i| {
                let mut model = Model::base();
                model.set_attribute("index", i).unwrap();
                (model.storage_key(), model)
            })
            .collect()
    }

    #[test]
    fn test_encode_writes_every_key_once() {
        let objects = objects(3);
        let bytes = encode(&objects).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.len(), 3);
        for (key, model) in &objects {
            assert_eq!(decoded[key], Value::Object(model.to_record()));
        }
    }

    #[test]
    fn test_encode_empty_mapping() {
        let bytes = encode(&BTreeMap::new()).unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let objects = objects(5);
        assert_eq!(encode(&objects).unwrap(), encode(&objects).unwrap());
    }

    #[test]
    fn test_encoded_records_are_tagged() {
        let objects = objects(1);
        let decoded = decode(&encode(&objects).unwrap()).unwrap();
        let record = decoded.values().next().unwrap();
        assert_eq!(record["__class__"], json!("BaseModel"));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = decode(b"{\"BaseModel.1\": ").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject));
    }

    #[test]
    fn test_decode_passes_non_object_entries_through() {
        let decoded = decode(br#"{"BaseModel.1": "oops", "BaseModel.2": {}}"#).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["BaseModel.1"], json!("oops"));
        assert_eq!(decoded["BaseModel.2"], json!({}));
    }
}
