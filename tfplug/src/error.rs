//! Framework errors
//!
//! These describe misuse of the host or of a [`crate::DynamicValue`]. Problems
//! with a user's configuration travel as [`crate::Diagnostic`]s instead.

use std::fmt;

/// Registry a type name was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Resource,
    DataSource,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Resource => f.write_str("resource"),
            TypeKind::DataSource => f.write_str("data source"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("unknown {kind} type {name}")]
    UnknownType { kind: TypeKind, name: String },

    #[error("value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} but found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("no attribute named {0}")]
    AttributeNotFound(String),

    #[error("invalid attribute path: {0}")]
    InvalidPath(String),
}

impl TfplugError {
    pub(crate) fn unknown(kind: TypeKind, name: &str) -> Self {
        TfplugError::UnknownType {
            kind,
            name: name.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TfplugError>;
