use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_money;

/// Units a catalog product can be sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductUnit {
    Box,
    Dozen,
    Both,
}

impl ProductUnit {
    /// Whether a cart/order line in `unit` can be taken from this product
    pub fn supports(&self, unit: Unit) -> bool {
        match self {
            ProductUnit::Box => unit == Unit::Box,
            ProductUnit::Dozen => unit == Unit::Dozen,
            ProductUnit::Both => true,
        }
    }

    /// Units a buyer may choose for this product
    pub fn available_units(&self) -> &'static [Unit] {
        match self {
            ProductUnit::Box => &[Unit::Box],
            ProductUnit::Dozen => &[Unit::Dozen],
            ProductUnit::Both => &[Unit::Box, Unit::Dozen],
        }
    }
}

/// Unit chosen for a single cart or order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Box,
    Dozen,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Box => write!(f, "box"),
            Unit::Dozen => write!(f, "dozen"),
        }
    }
}

/// Product image reference with ordering
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub order_index: i32,
}

/// Represents a catalog product in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Kaju Katli")]
    pub name: String,
    /// Maximum retail price
    #[schema(value_type = f64, example = 550.0)]
    pub mrp: Decimal,
    /// Selling price
    #[schema(value_type = f64, example = 500.0)]
    pub price: Decimal,
    /// Derived: max(0, mrp - price), recomputed on every write
    #[schema(value_type = f64, example = 50.0)]
    pub discount: Decimal,
    pub unit: ProductUnit,
    pub description: String,
    #[schema(value_type = Vec<ProductImage>)]
    pub images: Json<Vec<ProductImage>>,
    pub is_active: bool,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived product discount: the gap between MRP and selling price, floored at zero
pub fn derived_discount(mrp: Decimal, price: Decimal) -> Decimal {
    (mrp - price).max(Decimal::ZERO)
}

/// Request DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,
    #[validate(custom = "validate_money")]
    #[schema(value_type = f64)]
    pub mrp: Decimal,
    #[validate(custom = "validate_money")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub unit: ProductUnit,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// Request DTO for updating a product; all fields optional for partial updates
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: Option<String>,
    #[validate(custom = "validate_money")]
    #[schema(value_type = Option<f64>)]
    pub mrp: Option<Decimal>,
    #[validate(custom = "validate_money")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub unit: Option<ProductUnit>,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,
    pub images: Option<Vec<ProductImage>>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_derived_discount() {
        assert_eq!(derived_discount(dec!(550), dec!(500)), dec!(50));
        assert_eq!(derived_discount(dec!(500), dec!(500)), dec!(0));
        // Selling above MRP never produces a negative discount
        assert_eq!(derived_discount(dec!(450), dec!(500)), dec!(0));
    }

    #[test]
    fn test_product_unit_supports() {
        assert!(ProductUnit::Box.supports(Unit::Box));
        assert!(!ProductUnit::Box.supports(Unit::Dozen));
        assert!(ProductUnit::Dozen.supports(Unit::Dozen));
        assert!(!ProductUnit::Dozen.supports(Unit::Box));
        assert!(ProductUnit::Both.supports(Unit::Box));
        assert!(ProductUnit::Both.supports(Unit::Dozen));
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&Unit::Box).unwrap(), "\"box\"");
        assert_eq!(serde_json::to_string(&Unit::Dozen).unwrap(), "\"dozen\"");

        let unit: ProductUnit = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(unit, ProductUnit::Both);
    }

    #[test]
    fn test_create_request_validation() {
        use validator::Validate;

        let valid = CreateProductRequest {
            name: "Kaju Katli".to_string(),
            mrp: dec!(550),
            price: dec!(500),
            unit: ProductUnit::Box,
            description: String::new(),
            images: vec![],
            category_id: None,
        };
        assert!(valid.validate().is_ok());

        let negative_price = CreateProductRequest {
            price: dec!(-1),
            ..valid.clone()
        };
        assert!(negative_price.validate().is_err());

        let empty_name = CreateProductRequest {
            name: String::new(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }
}
