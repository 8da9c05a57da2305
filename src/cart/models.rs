use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::products::models::Unit;

/// A single cart line. Price and discount are snapshotted when the item is
/// added; checkout charges these values regardless of later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit: Unit,
    pub price_at_add: Decimal,
    #[serde(default)]
    pub discount_at_add: Decimal,
}

impl CartItem {
    /// Effective line price after the snapshotted discount
    pub fn line_total(&self) -> Decimal {
        (self.price_at_add - self.discount_at_add) * Decimal::from(self.quantity)
    }
}

/// One cart document per user, upserted on first access
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Json<Vec<CartItem>>,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Subtotal and item count over the snapshotted line values
    pub fn totals(&self) -> CartTotals {
        let subtotal = self.items.iter().map(CartItem::line_total).sum();
        let item_count = self.items.iter().map(|item| item.quantity).sum();

        CartTotals {
            subtotal,
            item_count,
        }
    }
}

/// Computed cart totals returned alongside the cart document
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub item_count: i32,
}

/// Response DTO for cart endpoints
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub subtotal: Decimal,
    pub item_count: i32,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let totals = cart.totals();
        Self {
            cart,
            subtotal: totals.subtotal,
            item_count: totals.item_count,
        }
    }
}

/// Request DTO for adding an item to the cart
#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub unit: Unit,
}

/// Request DTO for updating a cart line's quantity
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub unit: Unit,
}

/// Query parameters identifying a cart line by unit
#[derive(Debug, Deserialize)]
pub struct CartLineQuery {
    pub unit: Unit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cart_with_items(items: Vec<CartItem>) -> Cart {
        Cart {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: Json(items),
            tenant_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total_applies_snapshot_discount() {
        let item = CartItem {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit: Unit::Box,
            price_at_add: dec!(500),
            discount_at_add: dec!(50),
        };
        assert_eq!(item.line_total(), dec!(1350));
    }

    #[test]
    fn test_totals_sum_all_lines() {
        let cart = cart_with_items(vec![
            CartItem {
                product_id: Uuid::new_v4(),
                quantity: 2,
                unit: Unit::Box,
                price_at_add: dec!(500),
                discount_at_add: dec!(0),
            },
            CartItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit: Unit::Dozen,
                price_at_add: dec!(120),
                discount_at_add: dec!(20),
            },
        ]);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, dec!(1100));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_totals_empty_cart() {
        let cart = cart_with_items(vec![]);
        let totals = cart.totals();
        assert_eq!(totals.subtotal, dec!(0));
        assert_eq!(totals.item_count, 0);
    }
}
