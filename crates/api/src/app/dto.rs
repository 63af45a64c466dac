use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::{Map, Value};

use catalog_core::DomainError;
use catalog_products::{NewProduct, ProductPatch};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /products`: every field required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub price: Decimal,
}

/// Body of `PUT /products/{id}`: absent or `null` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
}

/// Query string of `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

impl CreateProductRequest {
    /// Parse a JSON body, reporting the first offending field.
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        let obj = parse_object(body)?;
        Ok(Self {
            name: required(string_field(&obj, "name")?, "name")?,
            category: required(string_field(&obj, "category")?, "category")?,
            price: required(price_field(&obj)?, "price")?,
        })
    }

    pub fn into_new_product(self) -> NewProduct {
        NewProduct::new(self.name, self.category, self.price)
    }
}

impl UpdateProductRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        let obj = parse_object(body)?;
        Ok(Self {
            name: string_field(&obj, "name")?,
            category: string_field(&obj, "category")?,
            price: price_field(&obj)?,
        })
    }

    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            name: self.name,
            category: self.category,
            price: self.price,
        }
    }
}

// -------------------------
// JSON field helpers
// -------------------------

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, DomainError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(DomainError::validation("body", "request body must be a JSON object")),
        Err(e) => Err(DomainError::validation(
            "body",
            format!("request body is not valid JSON: {e}"),
        )),
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::validation(field, format!("{field} is required")))
}

/// `None` for an absent or `null` field.
fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<Option<String>, DomainError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DomainError::validation(field, format!("{field} must be a string"))),
    }
}

fn price_field(obj: &Map<String, Value>) -> Result<Option<Decimal>, DomainError> {
    match obj.get("price") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let price = n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_u64().map(Decimal::from))
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .ok_or_else(|| DomainError::validation("price", "price is out of range"))?;
            Ok(Some(price))
        }
        Some(_) => Err(DomainError::validation(
            "price",
            "price must be a number, something else was provided",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: DomainError) -> &'static str {
        err.field().expect("validation error")
    }

    #[test]
    fn create_parses_all_fields() {
        let req = CreateProductRequest::from_json(
            br#"{"name":"Hammer","category":"tools","price":12.5}"#,
        )
        .unwrap();
        assert_eq!(req.name, "Hammer");
        assert_eq!(req.category, "tools");
        assert_eq!(req.price, Decimal::new(125, 1));
    }

    #[test]
    fn create_accepts_integer_prices() {
        let req = CreateProductRequest::from_json(br#"{"name":"A","category":"b","price":3}"#).unwrap();
        assert_eq!(req.price, Decimal::from(3));
    }

    #[test]
    fn create_rejects_non_numeric_price() {
        let err = CreateProductRequest::from_json(
            br#"{"name":"Hammer","category":"tools","price":"cheap"}"#,
        )
        .unwrap_err();
        assert_eq!(field_of(err.clone()), "price");
        assert!(err.to_string().contains("price must be a number"));
    }

    #[test]
    fn create_rejects_numeric_strings_too() {
        let err = CreateProductRequest::from_json(
            br#"{"name":"Hammer","category":"tools","price":"12.5"}"#,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "price");
    }

    #[test]
    fn create_requires_every_field() {
        let err = CreateProductRequest::from_json(br#"{"name":"Hammer","price":1}"#).unwrap_err();
        assert_eq!(field_of(err.clone()), "category");
        assert_eq!(err.to_string(), "category is required");
    }

    #[test]
    fn create_rejects_non_string_name() {
        let err = CreateProductRequest::from_json(br#"{"name":7,"category":"x","price":1}"#).unwrap_err();
        assert_eq!(field_of(err), "name");
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert_eq!(field_of(CreateProductRequest::from_json(b"[]").unwrap_err()), "body");
        assert_eq!(field_of(UpdateProductRequest::from_json(b"{oops").unwrap_err()), "body");
    }

    #[test]
    fn update_treats_null_as_absent() {
        let req = UpdateProductRequest::from_json(br#"{"name":null,"category":"garden"}"#).unwrap();
        assert_eq!(
            req.into_patch(),
            ProductPatch {
                name: None,
                category: Some("garden".to_string()),
                price: None,
            }
        );
    }

    #[test]
    fn update_keeps_empty_strings() {
        let req = UpdateProductRequest::from_json(br#"{"category":""}"#).unwrap();
        assert_eq!(req.category.as_deref(), Some(""));
    }

    #[test]
    fn update_rejects_non_numeric_price() {
        let err = UpdateProductRequest::from_json(br#"{"price":true}"#).unwrap_err();
        assert_eq!(field_of(err), "price");
    }
}
