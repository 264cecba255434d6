//! Permission Model

use serde::{Deserialize, Serialize};

use super::{NoPayload, Resource};
use crate::listing::{Column, FieldValue, Listable, opt_text};

/// Permission definition, assignable to admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionDef {
    pub id: String,
    /// Permission string, e.g. `products` or `sales:*`
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Resource for PermissionDef {
    type Create = NoPayload;
    type Update = NoPayload;

    const NAME: &'static str = "permission";
    const PATH: &'static str = "permissions";
    const READ_ONLY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("name", "Name"),
    Column::new("description", "Description"),
];

impl Listable for PermissionDef {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["name", "description"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "description" => opt_text(&self.description),
            _ => None,
        }
    }
}
