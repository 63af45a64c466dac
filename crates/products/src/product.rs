use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{Entity, ProductId};

/// A stored product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl Product {
    /// Apply every field present in `patch`, leaving the others untouched.
    ///
    /// Present fields are always written, even when the value equals the
    /// current one or is an empty string.
    pub fn apply_patch(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }

    /// Whether this product's name matches `name` exactly (case-sensitive).
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name
    }

    /// Whether this product belongs to `category` exactly (case-sensitive).
    pub fn in_category(&self, category: &str) -> bool {
        self.category == category
    }
}

/// Input for inserting a product; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
        }
    }

    /// Build the stored entity once the store has assigned `id`.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
        }
    }
}

/// Partial update: `None` means "leave unchanged", `Some` means "set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        NewProduct::new("Widget", "tools", Decimal::new(1999, 2)).into_product(ProductId::new(1))
    }

    #[test]
    fn into_product_keeps_user_supplied_fields() {
        let product = widget();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.name, "Widget");
        assert_eq!(product.category, "tools");
        assert_eq!(product.price, Decimal::new(1999, 2));
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut product = widget();
        let before = product.clone();
        let patch = ProductPatch::default();
        assert!(patch.is_empty());
        product.apply_patch(&patch);
        assert_eq!(product, before);
    }

    #[test]
    fn category_only_patch_leaves_name_and_price() {
        let mut product = widget();
        product.apply_patch(&ProductPatch {
            category: Some("hardware".to_string()),
            ..ProductPatch::default()
        });
        assert_eq!(product.category, "hardware");
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, Decimal::new(1999, 2));
    }

    #[test]
    fn empty_string_is_a_value_not_an_absence() {
        let mut product = widget();
        product.apply_patch(&ProductPatch {
            name: Some(String::new()),
            ..ProductPatch::default()
        });
        assert_eq!(product.name, "");
    }

    #[test]
    fn price_serializes_as_json_number() {
        let json = serde_json::to_value(widget()).unwrap();
        assert_eq!(json["price"], serde_json::json!(19.99));
        assert_eq!(json["id"], serde_json::json!(1));
    }

    #[test]
    fn name_and_category_matches_are_exact() {
        let product = widget();
        assert!(product.has_name("Widget"));
        assert!(!product.has_name("widget"));
        assert!(product.in_category("tools"));
        assert!(!product.in_category("tool"));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn price() -> impl Strategy<Value = Decimal> {
            (0i64..10_000_000, 0u32..4).prop_map(|(m, s)| Decimal::new(m, s))
        }

        proptest! {
            /// Property: fields absent from a patch survive it unchanged.
            #[test]
            fn absent_fields_are_preserved(
                name in proptest::option::of("[A-Za-z0-9 ]{0,20}"),
                category in proptest::option::of("[a-z]{0,10}"),
                price in proptest::option::of(price()),
            ) {
                let mut product = widget();
                let before = product.clone();
                let patch = ProductPatch { name: name.clone(), category: category.clone(), price };
                product.apply_patch(&patch);

                prop_assert_eq!(product.id, before.id);
                prop_assert_eq!(&product.name, name.as_ref().unwrap_or(&before.name));
                prop_assert_eq!(&product.category, category.as_ref().unwrap_or(&before.category));
                prop_assert_eq!(product.price, price.unwrap_or(before.price));
            }

            /// Property: applying the same patch twice is the same as applying it once.
            #[test]
            fn patch_is_idempotent(
                name in proptest::option::of("[A-Za-z0-9 ]{0,20}"),
                price in proptest::option::of(price()),
            ) {
                let patch = ProductPatch { name, category: None, price };
                let mut once = widget();
                once.apply_patch(&patch);
                let mut twice = once.clone();
                twice.apply_patch(&patch);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
