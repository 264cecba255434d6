//! Shared types for the Tally console
//!
//! Wire models, the response envelope, the error taxonomy and small
//! helpers used by both the HTTP client and the console.

pub mod client;
pub mod error;
pub mod intent;
pub mod listing;
pub mod models;
pub mod response;
pub mod types;
pub mod util;
pub mod validation;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorKind};
pub use intent::CrudAction;
pub use listing::{Column, FieldValue, Listable};
pub use models::Resource;
pub use response::{ApiResponse, OneOrMany, Pagination};
