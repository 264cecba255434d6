//! Admin Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Resource, default_true};
use crate::client::Role;
use crate::error::AppResult;
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_optional_non_negative,
    validate_optional_text, validate_password, validate_required_text,
};

/// Admin / user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub uuid: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub salary: Decimal,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Branch reference (String ID)
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
    #[serde(default)]
    pub fired_at: Option<NaiveDate>,
}

impl Admin {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create admin payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub salary: Decimal,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
}

/// Update admin payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fired_at: Option<NaiveDate>,
}

impl Resource for Admin {
    type Create = AdminCreate;
    type Update = AdminUpdate;

    const NAME: &'static str = "admin";
    const PATH: &'static str = "admins";

    fn key(&self) -> &str {
        &self.uuid
    }

    fn validate_create(payload: &AdminCreate) -> AppResult<()> {
        validate_required_text(&payload.first_name, "first_name", MAX_NAME_LEN)?;
        validate_required_text(&payload.last_name, "last_name", MAX_NAME_LEN)?;
        validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
        validate_password(&payload.password, "password")?;
        validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_non_negative(payload.salary, "salary")
    }

    fn validate_update(payload: &AdminUpdate) -> AppResult<()> {
        if let Some(username) = &payload.username {
            validate_required_text(username, "username", MAX_SHORT_TEXT_LEN)?;
        }
        if let Some(password) = &payload.password {
            validate_password(password, "password")?;
        }
        validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_non_negative(payload.salary, "salary")
    }
}

const COLUMNS: &[Column] = &[
    Column::new("uuid", "ID"),
    Column::new("name", "Name"),
    Column::new("username", "Username"),
    Column::new("phone", "Phone"),
    Column::new("role", "Role"),
    Column::new("salary", "Salary"),
    Column::new("branch", "Branch"),
    Column::new("is_active", "Active"),
    Column::new("hired_at", "Hired"),
    Column::new("fired_at", "Fired"),
];

impl Listable for Admin {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["name", "username", "phone"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "uuid" => Some(FieldValue::from(&self.uuid)),
            "name" => Some(FieldValue::text(self.full_name())),
            "first_name" => Some(FieldValue::from(&self.first_name)),
            "last_name" => Some(FieldValue::from(&self.last_name)),
            "username" => Some(FieldValue::from(&self.username)),
            "phone" => opt_text(&self.phone),
            "role" => Some(FieldValue::from(self.role.name())),
            "salary" => Some(FieldValue::from(self.salary)),
            "branch" => opt_text(&self.branch),
            "is_active" => Some(FieldValue::from(self.is_active)),
            "hired_at" => self.hired_at.map(FieldValue::from),
            "fired_at" => self.fired_at.map(FieldValue::from),
            "permissions" => Some(FieldValue::text(self.permissions.join(", "))),
            _ => None,
        }
    }
}
