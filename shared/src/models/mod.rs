//! Data models
//!
//! Mirrors of the backend's response shapes. All identifiers are strings;
//! admins are keyed by `uuid`, everything else by `id`.

pub mod admin;
pub mod backup;
pub mod branch;
pub mod brand;
pub mod category;
pub mod debt;
pub mod permission;
pub mod product;
pub mod report;
pub mod sale;
pub mod statistics;

// Re-exports
pub use admin::*;
pub use backup::*;
pub use branch::*;
pub use brand::*;
pub use category::*;
pub use debt::*;
pub use permission::*;
pub use product::*;
pub use report::*;
pub use sale::*;
pub use statistics::*;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;

use crate::error::AppResult;
use crate::listing::Listable;

/// A remotely stored collection item
///
/// Ties an entity to its endpoint, its identifier and its write payloads.
pub trait Resource:
    Listable + Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Create payload
    type Create: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    /// Update payload (fields optional)
    type Update: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;

    /// Singular name, used in messages and logs
    const NAME: &'static str;
    /// Collection path below the API base URL
    const PATH: &'static str;
    /// Records are server-managed and cannot be deleted from the console
    const READ_ONLY: bool = false;

    /// Unique identifier within the collection
    fn key(&self) -> &str;

    /// Client-side checks run before a create request is sent
    fn validate_create(_payload: &Self::Create) -> AppResult<()> {
        Ok(())
    }

    /// Client-side checks run before an update request is sent
    fn validate_update(_payload: &Self::Update) -> AppResult<()> {
        Ok(())
    }

    /// This record with `update` applied
    fn merged(&self, update: &Self::Update) -> AppResult<Self> {
        crate::util::merge_record(self, update)
    }
}

/// Payload type for operations a resource does not support
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NoPayload {}

fn default_true() -> bool {
    true
}
