//! Sale Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::{AppError, AppResult};
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::types::DateParts;
use crate::validation::validate_non_negative;

/// A recorded sale line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Product reference (String ID)
    pub product: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: i64,
    /// Total charged for the line
    pub amount: Decimal,
    /// Seller (admin uuid)
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(flatten)]
    pub date: DateParts,
}

/// Create sale payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCreate {
    pub product: String,
    pub quantity: i64,
    pub amount: Decimal,
}

/// Update sale payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl Resource for Sale {
    type Create = SaleCreate;
    type Update = SaleUpdate;

    const NAME: &'static str = "sale";
    const PATH: &'static str = "sales";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &SaleCreate) -> AppResult<()> {
        if payload.product.trim().is_empty() {
            return Err(AppError::field("product", "product must not be empty"));
        }
        if payload.quantity <= 0 {
            return Err(AppError::field("quantity", "quantity must be positive"));
        }
        validate_non_negative(payload.amount, "amount")
    }

    fn validate_update(payload: &SaleUpdate) -> AppResult<()> {
        if let Some(quantity) = payload.quantity
            && quantity <= 0
        {
            return Err(AppError::field("quantity", "quantity must be positive"));
        }
        if let Some(amount) = payload.amount {
            validate_non_negative(amount, "amount")?;
        }
        Ok(())
    }
}

/// Date field shared by the dated records
pub(crate) fn date_field(date: &DateParts) -> FieldValue {
    match date.to_date() {
        Some(d) => FieldValue::Date(d),
        None => FieldValue::text(date.iso()),
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("date", "Date"),
    Column::new("product_name", "Product"),
    Column::new("quantity", "Quantity"),
    Column::new("amount", "Amount"),
    Column::new("seller", "Seller"),
    Column::new("branch", "Branch"),
];

impl Listable for Sale {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["product_name", "product", "seller"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "product" => Some(FieldValue::from(&self.product)),
            "product_name" => opt_text(&self.product_name),
            "quantity" => Some(FieldValue::from(self.quantity)),
            "amount" => Some(FieldValue::from(self.amount)),
            "seller" => opt_text(&self.seller),
            "branch" => opt_text(&self.branch),
            "date" => Some(date_field(&self.date)),
            "year" => Some(FieldValue::from(self.date.year as i64)),
            "month" => Some(FieldValue::from(self.date.month as i64)),
            _ => None,
        }
    }
}
