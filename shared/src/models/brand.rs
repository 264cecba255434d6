//! Brand Model

use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::AppResult;
use crate::listing::{Column, FieldValue, Listable};
use crate::validation::{MAX_NAME_LEN, validate_required_text};

/// Brand entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_count: i64,
}

/// Create brand payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandCreate {
    pub name: String,
}

/// Update brand payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Resource for Brand {
    type Create = BrandCreate;
    type Update = BrandUpdate;

    const NAME: &'static str = "brand";
    const PATH: &'static str = "brands";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &BrandCreate) -> AppResult<()> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)
    }

    fn validate_update(payload: &BrandUpdate) -> AppResult<()> {
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

impl Listable for Brand {
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
