//! Unified error system for the console
//!
//! - [`ErrorKind`]: what went wrong, independent of how it is shown
//! - [`AppError`]: kind + human readable message + optional details
//!
//! Operations never surface bare strings. The presentation layer picks a
//! rendering per kind (see the console's notice module).
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorKind};
//!
//! let err = AppError::validation("name must not be empty").with_detail("field", "name");
//! assert_eq!(err.kind, ErrorKind::Validation);
//! ```

mod http;
mod kind;
mod types;

pub use kind::ErrorKind;
pub use types::{AppError, AppResult};
