//! Debt Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Resource;
use super::sale::date_field;
use crate::error::{AppError, AppResult};
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::types::DateParts;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative,
    validate_optional_non_negative, validate_optional_text, validate_required_text,
};

/// Customer debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub customer: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub paid: Decimal,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub date: DateParts,
}

impl Debt {
    /// Amount still owed
    pub fn remaining(&self) -> Decimal {
        (self.amount - self.paid).max(Decimal::ZERO)
    }
}

/// Create debt payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtCreate {
    pub customer: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub date: DateParts,
}

/// Update debt payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Resource for Debt {
    type Create = DebtCreate;
    type Update = DebtUpdate;

    const NAME: &'static str = "debt";
    const PATH: &'static str = "debts";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &DebtCreate) -> AppResult<()> {
        validate_required_text(&payload.customer, "customer", MAX_NAME_LEN)?;
        validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
        validate_non_negative(payload.amount, "amount")?;
        if payload.date.to_date().is_none() {
            return Err(AppError::field(
                "date",
                format!("{} is not a valid date", payload.date.iso()),
            ));
        }
        Ok(())
    }

    fn validate_update(payload: &DebtUpdate) -> AppResult<()> {
        if let Some(customer) = &payload.customer {
            validate_required_text(customer, "customer", MAX_NAME_LEN)?;
        }
        validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
        validate_optional_non_negative(payload.amount, "amount")?;
        validate_optional_non_negative(payload.paid, "paid")
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("date", "Date"),
    Column::new("customer", "Customer"),
    Column::new("phone", "Phone"),
    Column::new("amount", "Amount"),
    Column::new("paid", "Paid"),
    Column::new("remaining", "Remaining"),
    Column::new("is_closed", "Closed"),
    Column::new("note", "Note"),
];

impl Listable for Debt {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["customer", "phone", "note"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "customer" => Some(FieldValue::from(&self.customer)),
            "phone" => opt_text(&self.phone),
            "amount" => Some(FieldValue::from(self.amount)),
            "paid" => Some(FieldValue::from(self.paid)),
            "remaining" => Some(FieldValue::from(self.remaining())),
            "is_closed" => Some(FieldValue::from(self.is_closed)),
            "branch" => opt_text(&self.branch),
            "note" => opt_text(&self.note),
            "date" => Some(date_field(&self.date)),
            _ => None,
        }
    }
}
