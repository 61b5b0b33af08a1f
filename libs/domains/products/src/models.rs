use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned by storage
    pub id: i64,
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Unit price, always greater than zero
    pub price: f64,
    /// Units in stock
    pub quantity: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Case-insensitive substring match over name and description.
    ///
    /// An empty keyword matches every product.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Overwrite every mutable field, keeping id and creation time.
    pub fn apply_update(&mut self, input: UpdateProduct) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.quantity = input.quantity;
        self.updated_at = Utc::now();
    }
}

/// DTO for creating a new product
///
/// An `id` in the body is ignored. `stock` is accepted as an alias of `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        length(min = 1, max = 255, message = "name must be 1 to 255 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: f64,
    #[serde(alias = "stock")]
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// DTO for replacing a product's fields
///
/// Same rules as [`CreateProduct`]; the path id always wins over any body `id`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(
        length(min = 1, max = 255, message = "name must be 1 to 255 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: f64,
    #[serde(alias = "stock")]
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
}

/// Query parameters for keyword search
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Matched case-insensitively against name and description
    pub keyword: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, quantity: i32) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: name.to_string(),
            description: description.to_string(),
            price: 1.0,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_product_accepts_stock_alias_and_ignores_id() {
        let input: CreateProduct =
            serde_json::from_str(r#"{"id": 77, "name": "Widget", "price": 9.99, "stock": 5}"#)
                .unwrap();

        assert_eq!(input.quantity, 5);
        assert_eq!(input.description, "");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_product_rules() {
        let valid = CreateProduct {
            name: "Widget".into(),
            description: String::new(),
            price: 9.99,
            quantity: 0,
        };
        assert!(valid.validate().is_ok());

        let zero_price = CreateProduct { price: 0.0, ..valid.clone() };
        assert!(zero_price.validate().unwrap_err().field_errors().contains_key("price"));

        let negative_qty = CreateProduct { quantity: -1, ..valid.clone() };
        assert!(negative_qty.validate().unwrap_err().field_errors().contains_key("quantity"));

        let blank_name = CreateProduct { name: "   ".into(), ..valid.clone() };
        assert!(blank_name.validate().unwrap_err().field_errors().contains_key("name"));

        let long_description = CreateProduct { description: "x".repeat(1001), ..valid };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_missing_required_field_fails_to_deserialize() {
        let result = serde_json::from_str::<CreateProduct>(r#"{"name": "Widget"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_matches_keyword_is_case_insensitive() {
        let p = product("Blue Widget", "Sturdy steel frame", 3);

        assert!(p.matches_keyword("widget"));
        assert!(p.matches_keyword("STEEL"));
        assert!(p.matches_keyword(""));
        assert!(!p.matches_keyword("gadget"));
    }

    #[test]
    fn test_apply_update_keeps_identity() {
        let mut p = product("Widget", "", 0);
        let created_at = p.created_at;

        p.apply_update(UpdateProduct {
            name: "Gadget".into(),
            description: "new".into(),
            price: 2.5,
            quantity: 4,
        });

        assert_eq!(p.id, 1);
        assert_eq!(p.created_at, created_at);
        assert_eq!(p.name, "Gadget");
        assert!(p.is_in_stock());
    }
}
