//! Product Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::{AppError, AppResult};
use crate::listing::{Column, FieldValue, Listable, opt_text};
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_count, validate_non_negative,
    validate_optional_non_negative, validate_optional_text, validate_required_text,
};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Price before tax
    pub net_price: Decimal,
    /// Shelf price
    pub sell_price: Decimal,
    /// Purchase cost
    pub cost_price: Decimal,
    /// Units in stock
    #[serde(default)]
    pub quantity: i64,
    /// Restock threshold
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub restock_at: Option<NaiveDate>,
    /// Category reference (String ID)
    #[serde(default)]
    pub category: Option<String>,
    /// Brand reference (String ID)
    #[serde(default)]
    pub brand: Option<String>,
    /// Branch reference (String ID)
    #[serde(default)]
    pub branch: Option<String>,
}

/// Stock level bucket used by the status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    Out,
}

impl StockStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::Low => "low",
            Self::Out => "out",
        }
    }
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        if self.quantity <= 0 {
            StockStatus::Out
        } else if self.quantity <= self.min_quantity {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Sell price minus cost
    pub fn margin(&self) -> Decimal {
        self.sell_price - self.cost_price
    }

    /// Whether the product is past its expiry date on `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_at.is_some_and(|d| d < today)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub net_price: Decimal,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub restock_at: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restock_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Resource for Product {
    type Create = ProductCreate;
    type Update = ProductUpdate;

    const NAME: &'static str = "product";
    const PATH: &'static str = "products";

    fn key(&self) -> &str {
        &self.id
    }

    fn validate_create(payload: &ProductCreate) -> AppResult<()> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        validate_optional_text(&payload.barcode, "barcode", MAX_SHORT_TEXT_LEN)?;
        validate_non_negative(payload.net_price, "net_price")?;
        validate_non_negative(payload.sell_price, "sell_price")?;
        validate_non_negative(payload.cost_price, "cost_price")?;
        validate_count(payload.quantity, "quantity")?;
        validate_count(payload.min_quantity, "min_quantity")?;
        if let (Some(restock), Some(expiry)) = (payload.restock_at, payload.expires_at)
            && restock > expiry
        {
            return Err(AppError::field(
                "restock_at",
                "restock_at must not be after expires_at",
            ));
        }
        Ok(())
    }

    fn validate_update(payload: &ProductUpdate) -> AppResult<()> {
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&payload.barcode, "barcode", MAX_SHORT_TEXT_LEN)?;
        validate_optional_non_negative(payload.net_price, "net_price")?;
        validate_optional_non_negative(payload.sell_price, "sell_price")?;
        validate_optional_non_negative(payload.cost_price, "cost_price")?;
        if let Some(quantity) = payload.quantity {
            validate_count(quantity, "quantity")?;
        }
        if let Some(min_quantity) = payload.min_quantity {
            validate_count(min_quantity, "min_quantity")?;
        }
        Ok(())
    }
}

const COLUMNS: &[Column] = &[
    Column::new("id", "ID"),
    Column::new("name", "Name"),
    Column::new("barcode", "Barcode"),
    Column::new("net_price", "Net price"),
    Column::new("sell_price", "Sell price"),
    Column::new("cost_price", "Cost price"),
    Column::new("quantity", "Quantity"),
    Column::new("stock_status", "Stock"),
    Column::new("expires_at", "Expires"),
    Column::new("restock_at", "Restock"),
    Column::new("category", "Category"),
    Column::new("brand", "Brand"),
];

impl Listable for Product {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn searchable() -> &'static [&'static str] {
        &["name", "barcode"]
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "barcode" => opt_text(&self.barcode),
            "net_price" => Some(FieldValue::from(self.net_price)),
            "sell_price" => Some(FieldValue::from(self.sell_price)),
            "cost_price" => Some(FieldValue::from(self.cost_price)),
            "margin" => Some(FieldValue::from(self.margin())),
            "quantity" => Some(FieldValue::from(self.quantity)),
            "min_quantity" => Some(FieldValue::from(self.min_quantity)),
            "stock_status" => Some(FieldValue::from(self.stock_status().name())),
            "expires_at" => self.expires_at.map(FieldValue::from),
            "restock_at" => self.restock_at.map(FieldValue::from),
            "category" => opt_text(&self.category),
            "brand" => opt_text(&self.brand),
            "branch" => opt_text(&self.branch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, min_quantity: i64) -> Product {
        Product {
            id: "p1".into(),
            name: "Cola".into(),
            barcode: None,
            net_price: Decimal::new(100, 2),
            sell_price: Decimal::new(150, 2),
            cost_price: Decimal::new(80, 2),
            quantity,
            min_quantity,
            expires_at: None,
            restock_at: None,
            category: None,
            brand: None,
            branch: None,
        }
    }

    #[test]
    fn test_stock_status() {
        assert_eq!(product(0, 5).stock_status(), StockStatus::Out);
        assert_eq!(product(5, 5).stock_status(), StockStatus::Low);
        assert_eq!(product(6, 5).stock_status(), StockStatus::InStock);
    }

    #[test]
    fn test_margin() {
        assert_eq!(product(1, 0).margin(), Decimal::new(70, 2));
    }

    #[test]
    fn test_is_expired() {
        let mut p = product(1, 0);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(!p.is_expired(today));
        p.expires_at = NaiveDate::from_ymd_opt(2024, 5, 31);
        assert!(p.is_expired(today));
    }

    #[test]
    fn test_validate_restock_after_expiry() {
        let payload = ProductCreate {
            name: "Milk".into(),
            barcode: None,
            net_price: Decimal::ONE,
            sell_price: Decimal::ONE,
            cost_price: Decimal::ONE,
            quantity: 1,
            min_quantity: 0,
            expires_at: NaiveDate::from_ymd_opt(2024, 1, 1),
            restock_at: NaiveDate::from_ymd_opt(2024, 2, 1),
            category: None,
            brand: None,
        };
        assert!(Product::validate_create(&payload).is_err());
    }

    #[test]
    fn test_wire_dates() {
        let p: Product = serde_json::from_str(
            r#"{"id":"p","name":"Tea","net_price":1,"sell_price":2,"cost_price":0.5,
                "quantity":3,"expires_at":"2025-01-31"}"#,
        )
        .unwrap();
        assert_eq!(p.expires_at, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(p.field("expires_at").unwrap().to_string(), "2025-01-31");
    }
}
