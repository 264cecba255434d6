//! Category Model

use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::AppResult;
use crate::listing::{Column, FieldValue, Listable};
use crate::validation::{MAX_NAME_LEN, validate_required_text};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Number of products assigned
    #[serde(default)]
    pub product_count: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Resource for Category {
    type Create = CategoryCreate;
    type Update = CategoryUpdate;

    const NAME: &'static str = "category";
    const PATH: &'static str = "categories";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &CategoryCreate) -> AppResult<()> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)
    }

    fn validate_update(payload: &CategoryUpdate) -> AppResult<()> {
        match &payload.name {
            Some(name) => validate_required_text(name, "name", MAX_NAME_LEN),
            None => Ok(()),
        }
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("name", "Name"),
    Column::new("product_count", "Products"),
];

impl Listable for Category {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["name"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "product_count" => Some(FieldValue::from(self.product_count)),
            _ => None,
        }
    }
}
