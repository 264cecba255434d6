//! API response types
//!
//! Every backend response is wrapped in the same envelope:
//! ```json
//! {
//!     "message": "Product updated",
//!     "data": { ... }
//! }
//! ```
//! Mutation endpoints are inconsistent about whether `data` is the record
//! itself or a one-element array, so single-record reads go through
//! [`OneOrMany`].

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Unified API response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Take the payload, failing if the server sent none
    pub fn into_data(self, what: &str) -> Result<T, AppError> {
        self.data
            .ok_or_else(|| AppError::invalid_response(format!("Missing {what} data")))
    }
}

impl<T> ApiResponse<OneOrMany<T>> {
    /// Take the single affected record from `data` or `data[0]`
    pub fn into_record(self, what: &str) -> Result<T, AppError> {
        self.into_data(what)?
            .into_first()
            .ok_or_else(|| AppError::invalid_response(format!("Empty {what} data")))
    }
}

/// Either a single value or a list of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// First value, if any
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.into_iter().next(),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    /// Create a new pagination
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    /// Whether a page follows this one
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
