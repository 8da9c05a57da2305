use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cart::models::{Cart, CartItem};
use crate::error::ApiError;

const CART_COLUMNS: &str = "id, user_id, items, tenant_id, created_at, updated_at";

/// Repository for cart documents
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new CartRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's cart, if one exists
    pub async fn find(&self, user_id: Uuid) -> Result<Option<Cart>, ApiError> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Fetch the user's cart, creating an empty one on first access
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<Cart, ApiError> {
        if let Some(cart) = self.find(user_id).await? {
            return Ok(cart);
        }

        // Concurrent first access races on the unique user_id; the loser
        // falls back to reading the winner's row.
        let inserted = sqlx::query_as::<_, Cart>(&format!(
            r#"
            INSERT INTO carts (user_id, items)
            VALUES ($1, '[]')
            ON CONFLICT (user_id) DO NOTHING
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(cart) => Ok(cart),
            None => self
                .find(user_id)
                .await?
                .ok_or_else(|| ApiError::InternalError("Cart upsert lost its row".to_string())),
        }
    }

    /// Replace the cart's item array
    pub async fn save_items(&self, user_id: Uuid, items: &[CartItem]) -> Result<Cart, ApiError> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            r#"
            UPDATE carts
            SET items = $1, updated_at = NOW()
            WHERE user_id = $2
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(Json(items))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Cart".to_string(),
            id: user_id.to_string(),
        })?;

        Ok(cart)
    }

    /// Empty the cart without deleting the document
    pub async fn clear(&self, user_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("UPDATE carts SET items = '[]', updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
