//! Dashboard statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline numbers shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub product_count: i64,
    #[serde(default)]
    pub low_stock_count: i64,
    #[serde(default)]
    pub sales_count: i64,
    #[serde(default)]
    pub sales_amount: Decimal,
    #[serde(default)]
    pub open_debt_amount: Decimal,
    #[serde(default)]
    pub admin_count: i64,
    #[serde(default)]
    pub branch_count: i64,
}

impl Statistics {
    /// Label/value rows for display
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Products", self.product_count.to_string()),
            ("Low stock", self.low_stock_count.to_string()),
            ("Sales", self.sales_count.to_string()),
            ("Sales amount", self.sales_amount.normalize().to_string()),
            ("Open debt", self.open_debt_amount.normalize().to_string()),
            ("Admins", self.admin_count.to_string()),
            ("Branches", self.branch_count.to_string()),
        ]
    }
}
