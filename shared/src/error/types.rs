//! Application error type

use super::kind::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Application error with a kind, a message and optional details
///
/// This is what every console operation returns on failure. Details carry
/// structured context such as the offending field of a validation error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            message: kind.default_message().to_string(),
            kind,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a detail entry
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Validation, msg)
    }

    /// Create a validation error bound to a field
    pub fn field(field: &str, msg: impl Into<String>) -> Self {
        Self::validation(msg).with_detail("field", field)
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Transport, msg)
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidResponse, msg)
    }

    /// Create a business error (server said no)
    pub fn business(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Business, msg)
    }

    /// Create an unauthorized error
    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Forbidden, msg)
    }

    /// Create a "not in local collection" error
    pub fn missing(resource: &str, id: &str) -> Self {
        Self::with_message(ErrorKind::Missing, format!("{resource} {id} not found"))
            .with_detail("resource", resource)
            .with_detail("id", id)
    }

    /// Create a busy error
    pub fn busy(id: &str) -> Self {
        Self::new(ErrorKind::Busy).with_detail("id", id)
    }

    /// Create a superseded error
    pub fn superseded() -> Self {
        Self::new(ErrorKind::Superseded)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Storage, msg)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
