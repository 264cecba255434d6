//! Branch Model

use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::AppResult;
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::validation::{MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_required_text};

/// Branch (shop location)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub employee_count: i64,
    /// Shop reference (String ID)
    #[serde(default)]
    pub shop: Option<String>,
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub name: String,
    pub location: String,
}

/// Update branch payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Resource for Branch {
    type Create = BranchCreate;
    type Update = BranchUpdate;

    const NAME: &'static str = "branch";
    const PATH: &'static str = "branches";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &BranchCreate) -> AppResult<()> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&payload.location, "location", MAX_ADDRESS_LEN)
    }

    fn validate_update(payload: &BranchUpdate) -> AppResult<()> {
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(location) = &payload.location {
            validate_required_text(location, "location", MAX_ADDRESS_LEN)?;
        }
        Ok(())
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("name", "Name"),
    Column::new("location", "Location"),
    Column::new("employee_count", "Employees"),
    Column::new("shop", "Shop"),
];

impl Listable for Branch {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["name", "location"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "location" => Some(FieldValue::from(&self.location)),
            "employee_count" => Some(FieldValue::from(self.employee_count)),
            "shop" => opt_text(&self.shop),
            _ => None,
        }
    }
}
