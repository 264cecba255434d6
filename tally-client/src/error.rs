//! Client error types

use shared::{AppError, ErrorKind};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response was not JSON (e.g. an HTML error page)
    #[error("Unexpected content type {content_type:?} (status {status})")]
    UnexpectedContent { status: u16, content_type: String },

    /// JSON body did not match the expected envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status, with the server's message
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Error kind for the console
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::UnexpectedContent { .. } => ErrorKind::Transport,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorKind::InvalidResponse,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api { status, .. } => http::StatusCode::from_u16(*status)
                .map(ErrorKind::from_status)
                .unwrap_or(ErrorKind::Business),
        }
    }

    /// Message meant for the user
    ///
    /// Server messages are passed through; transport failures get the
    /// generic text since their details are only useful in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Validation(m)
            | Self::Api { message: m, .. } => m.clone(),
            other => other.kind().default_message().to_string(),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let kind = err.kind();
        let mut app = AppError::with_message(kind, err.user_message());
        if let ClientError::Api { status, .. } = &err {
            app = app.with_detail("status", *status);
        }
        if !kind.is_server() {
            app = app.with_detail("cause", err.to_string());
        }
        app
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
