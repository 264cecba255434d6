//! Tally Client - HTTP client for the shop backend
//!
//! Provides typed access to the REST API: authentication, one repository
//! per resource, statistics and backup/restore.

pub mod config;
pub mod error;
pub mod http;
pub mod repository;

pub use config::{AuthScheme, ClientConfig, Scope};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use repository::{RemoteRepository, Repository};

// Re-export shared types for convenience
pub use shared::client::{LoginRequest, LoginResponse, Role, UserInfo};
pub use shared::{ApiResponse, AppError, AppResult, ErrorKind};
