//! Persisted local state
//!
//! 单个 JSON 文件，包含 `ui` / `auth` / `cart` / `settings` 四部分。
//! 登出时整个文件被清除。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Product, SaleCreate};
use shared::{AppError, AppResult};
use tally_client::AuthScheme;
use thiserror::Error;

use crate::session::AuthState;
use crate::view::{DEFAULT_PER_PAGE, ListQuery};

const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StateError> for AppError {
    fn from(err: StateError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Last query per list and the selected branch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(default)]
    pub selected_branch: Option<String>,
    /// Keyed by resource path
    #[serde(default)]
    pub queries: BTreeMap<String, ListQuery>,
}

impl UiState {
    pub fn query(&self, resource: &str) -> ListQuery {
        self.queries.get(resource).cloned().unwrap_or_default()
    }

    pub fn remember(&mut self, resource: &str, query: ListQuery) {
        self.queries.insert(resource.to_string(), query);
    }
}

/// A product waiting to be sold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl CartLine {
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Pending sale lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add `quantity` units, merging with an existing line
    ///
    /// The combined quantity may not exceed the product's stock.
    pub fn add(&mut self, product: &Product, quantity: i64) -> AppResult<&CartLine> {
        if quantity <= 0 {
            return Err(AppError::field("quantity", "quantity must be positive"));
        }
        let existing = self.lines.iter().position(|l| l.product == product.id);
        let current = existing.map_or(0, |i| self.lines[i].quantity);
        let wanted = current.checked_add(quantity).ok_or_else(|| {
            AppError::field("quantity", format!("quantity {quantity} is too large"))
        })?;
        if wanted > product.quantity {
            return Err(AppError::field(
                "quantity",
                format!("only {} of {} in stock", product.quantity, product.name),
            ));
        }

        let index = match existing {
            Some(index) => index,
            None => {
                self.lines.push(CartLine {
                    product: product.id.clone(),
                    name: product.name.clone(),
                    quantity: 0,
                    unit_price: product.sell_price,
                });
                self.lines.len() - 1
            }
        };
        self.lines[index].quantity = wanted;
        Ok(&self.lines[index])
    }

    pub fn remove(&mut self, product: &str) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product == product)?;
        Some(self.lines.remove(index))
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sale payloads for every line; the cart is emptied
    pub fn checkout(&mut self) -> Vec<SaleCreate> {
        std::mem::take(&mut self.lines)
            .into_iter()
            .map(|line| SaleCreate {
                amount: line.amount(),
                product: line.product,
                quantity: line.quantity,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub auth_scheme: Option<AuthScheme>,
    #[serde(default)]
    pub theme: Theme,
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            auth_scheme: None,
            theme: Theme::default(),
        }
    }
}

/// Everything kept between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub ui: UiState,
    #[serde(default)]
    pub auth: AuthState,
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub settings: Settings,
}

/// The state file in the data directory
#[derive(Debug, Clone)]
pub struct StateStore {
    file_path: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file_path: data_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Load the state; a missing file is an empty state
    pub fn load(&self) -> Result<PersistedState, StateError> {
        if !self.file_path.exists() {
            return Ok(PersistedState::default());
        }
        let content = std::fs::read_to_string(&self.file_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }

    /// Delete the state file
    pub fn purge(&self) -> Result<(), StateError> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {
                tracing::info!(path = %self.file_path.display(), "local state purged");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorKind;

    fn product(id: &str, stock: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": "Cola", "net_price": 1, "sell_price": 2.5,
            "cost_price": 1, "quantity": stock
        }))
        .unwrap()
    }

    #[test]
    fn test_cart_merges_lines_and_checks_stock() {
        let mut cart = Cart::default();
        let cola = product("p1", 5);
        cart.add(&cola, 2).unwrap();
        cart.add(&cola, 3).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 5);

        assert!(cart.add(&cola, 1).is_err());
        assert_eq!(cart.lines[0].quantity, 5);

        let empty = product("p2", 0);
        assert!(cart.add(&empty, 1).is_err());
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_cart_rejects_overflowing_quantity() {
        let mut cart = Cart::default();
        let cola = product("p1", 5);
        cart.add(&cola, 1).unwrap();

        let err = cart.add(&cola, i64::MAX).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 1);
    }

    #[test]
    fn test_checkout() {
        let mut cart = Cart::default();
        cart.add(&product("p1", 10), 4).unwrap();
        assert_eq!(cart.total(), Decimal::from(10));

        let sales = cart.checkout();
        assert!(cart.is_empty());
        assert_eq!(
            sales,
            vec![SaleCreate {
                product: "p1".into(),
                quantity: 4,
                amount: Decimal::from(10),
            }]
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        assert_eq!(store.load().unwrap(), PersistedState::default());
        store.purge().unwrap();
    }
}
