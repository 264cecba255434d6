//! Report Model (activity log)

use serde::{Deserialize, Serialize};

use super::sale::date_field;
use super::{NoPayload, Resource};
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::types::DateParts;

/// An activity log entry written by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    /// Who acted (admin uuid or username)
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(flatten)]
    pub date: DateParts,
}

impl Resource for Report {
    type Create = NoPayload;
    type Update = NoPayload;

    const NAME: &'static str = "report";
    const PATH: &'static str = "reports";

    fn key(&self) -> &str {
        &self.id
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("date", "Date"),
    Column::new("actor", "Actor"),
    Column::new("action", "Action"),
    Column::new("detail", "Detail"),
    Column::new("branch", "Branch"),
];

impl Listable for Report {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["actor", "action", "detail"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "actor" => Some(FieldValue::from(&self.actor)),
            "action" => Some(FieldValue::from(&self.action)),
            "detail" => opt_text(&self.detail),
            "branch" => opt_text(&self.branch),
            "date" => Some(date_field(&self.date)),
            _ => None,
        }
    }
}
