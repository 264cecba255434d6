//! Error kind classification

use serde::{Deserialize, Serialize};

/// Error kind
///
/// Kinds fall into three groups:
/// - client side: `Validation`, `Missing`, `Busy`, `Superseded`, `Storage`
/// - transport: `Transport`, `InvalidResponse`
/// - server side: `Unauthorized`, `Forbidden`, `NotFound`, `Business`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before it was sent
    Validation,
    /// Missing or rejected credentials (401)
    Unauthorized,
    /// Authenticated but not allowed (403)
    Forbidden,
    /// Server has no such record (404)
    NotFound,
    /// Server rejected the request with a message
    Business,
    /// Network failure, timeout, non-JSON body
    Transport,
    /// Body was JSON but not the expected envelope
    InvalidResponse,
    /// Local collection has no record with the given identifier
    Missing,
    /// A mutation for the same record is still in flight
    Busy,
    /// Response arrived after a newer request started
    Superseded,
    /// Local persisted state could not be read or written
    Storage,
}

impl ErrorKind {
    /// Get the string name for this kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Business => "business",
            Self::Transport => "transport",
            Self::InvalidResponse => "invalid_response",
            Self::Missing => "missing",
            Self::Busy => "busy",
            Self::Superseded => "superseded",
            Self::Storage => "storage",
        }
    }

    /// Default message shown when nothing more specific is known
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid input",
            Self::Unauthorized => "Please log in again",
            Self::Forbidden => "You do not have permission to do that",
            Self::NotFound => "Not found",
            Self::Business => "Request rejected",
            Self::Transport => "Something went wrong, please try again",
            Self::InvalidResponse => "Unexpected response from server",
            Self::Missing => "Record is no longer in the list",
            Self::Busy => "Request already in progress",
            Self::Superseded => "Response discarded, a newer request is running",
            Self::Storage => "Could not access local state",
        }
    }

    /// Whether the error originated on the server
    pub fn is_server(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::NotFound | Self::Business
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
