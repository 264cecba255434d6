//! Product reference resolution
//!
//! Products carry category and brand identifiers; lists show their names.

use std::collections::HashMap;

use shared::models::{Brand, Category, Product};

/// Name lookup for the identifiers a product references
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    categories: HashMap<String, String>,
    brands: HashMap<String, String>,
}

/// A product with its references spelled out
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProduct<'a> {
    pub product: &'a Product,
    pub category: Option<&'a str>,
    pub brand: Option<&'a str>,
}

impl ReferenceIndex {
    pub fn new<'a>(
        categories: impl IntoIterator<Item = &'a Category>,
        brands: impl IntoIterator<Item = &'a Brand>,
    ) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
            brands: brands
                .into_iter()
                .map(|b| (b.id.clone(), b.name.clone()))
                .collect(),
        }
    }

    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories.get(id).map(String::as_str)
    }

    pub fn brand_name(&self, id: &str) -> Option<&str> {
        self.brands.get(id).map(String::as_str)
    }

    /// Unknown identifiers resolve to `None`
    pub fn resolve<'a>(&'a self, product: &'a Product) -> ResolvedProduct<'a> {
        ResolvedProduct {
            product,
            category: product.category.as_deref().and_then(|id| self.category_name(id)),
            brand: product.brand.as_deref().and_then(|id| self.brand_name(id)),
        }
    }

    /// Copy of `product` with names in place of identifiers, for display
    pub fn with_names(&self, product: &Product) -> Product {
        let resolved = self.resolve(product);
        Product {
            category: resolved
                .category
                .map(str::to_string)
                .or_else(|| product.category.clone()),
            brand: resolved
                .brand
                .map(str::to_string)
                .or_else(|| product.brand.clone()),
            ..product.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let categories = vec![Category {
            id: "c1".into(),
            name: "Drinks".into(),
            product_count: 1,
        }];
        let brands = vec![Brand {
            id: "b1".into(),
            name: "Fizz".into(),
            product_count: 1,
        }];
        let index = ReferenceIndex::new(&categories, &brands);

        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "Cola", "net_price": 1, "sell_price": 2,
            "cost_price": 1, "category": "c1", "brand": "gone"
        }))
        .unwrap();

        let resolved = index.resolve(&product);
        assert_eq!(resolved.category, Some("Drinks"));
        assert_eq!(resolved.brand, None);

        let display = index.with_names(&product);
        assert_eq!(display.category.as_deref(), Some("Drinks"));
        assert_eq!(display.brand.as_deref(), Some("gone"));
    }
}
