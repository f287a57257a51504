//! Error types for hbnb.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific condition. The interpreter turns them into the short
//! `** ... **` diagnostics users see.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors raised while building, reconstructing, or mutating a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown model type '{name}'")]
    UnknownType {
        name: String,
    },

    #[error("Field '{field}' must be a string")]
    InvalidField {
        field: String,
    },

    #[error("Field '{field}' holds an invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Attribute '{name}' is reserved")]
    ReservedAttribute {
        name: String,
    },
}

/// Errors surfaced by interpreter commands.
///
/// The display form of each variant is the exact line printed to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("** class name missing **")]
    MissingClassName,

    #[error("** class doesn't exist **")]
    UnknownType,

    #[error("** instance id missing **")]
    MissingId,

    #[error("** no instance found **")]
    NotFound,

    #[error("** attribute name missing **")]
    MissingAttribute,

    #[error("** value missing **")]
    MissingValue,

    #[error("** attribute can't be updated **")]
    ReservedAttribute,

    #[error("*** Unknown syntax: {line}")]
    UnknownSyntax {
        line: String,
    },
}

/// Top-level error type for hbnb.
#[derive(Debug, Error)]
pub enum HbnbError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl HbnbError {
    /// Returns true if this is a model error.
    #[must_use]
    pub const fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Returns true if this is a command error.
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the error comes from a malformed backing file.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Codec(_)))
    }
}

/// Result type alias for hbnb operations.
pub type HbnbResult<T> = Result<T, HbnbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CodecError;

    #[test]
    fn test_model_error_unknown_type() {
        let err = ModelError::UnknownType {
            name: "Ghost".to_string(),
        };
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_command_error_messages() {
        assert_eq!(CommandError::MissingClassName.to_string(), "** class name missing **");
        assert_eq!(CommandError::UnknownType.to_string(), "** class doesn't exist **");
        assert_eq!(CommandError::MissingId.to_string(), "** instance id missing **");
        assert_eq!(CommandError::NotFound.to_string(), "** no instance found **");
        assert_eq!(
            CommandError::MissingAttribute.to_string(),
            "** attribute name missing **"
        );
        assert_eq!(CommandError::MissingValue.to_string(), "** value missing **");
    }

    #[test]
    fn test_unknown_syntax_echoes_line() {
        let err = CommandError::UnknownSyntax {
            line: "fly away".to_string(),
        };
        assert_eq!(err.to_string(), "*** Unknown syntax: fly away");
    }

    #[test]
    fn test_hbnb_error_from_model() {
        let err: HbnbError = ModelError::ReservedAttribute {
            name: "id".to_string(),
        }
        .into();
        assert!(err.is_model());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_hbnb_error_from_command() {
        let err: HbnbError = CommandError::NotFound.into();
        assert!(err.is_command());
        assert!(!err.is_decode());
    }

    #[test]
    fn test_hbnb_error_decode() {
        let err: HbnbError = StorageError::Codec(CodecError::NotAnObject).into();
        assert!(err.is_storage());
        assert!(err.is_decode());
    }
}
