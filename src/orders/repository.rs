use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::orders::error::OrderError;
use crate::orders::models::{
    DeliveryAddress, Order, OrderLine, OrderStatus, PageParams, PaymentMethod, PaymentStatus,
};
use crate::store_config::models::ReservedWindow;
use rust_decimal::Decimal;

const ORDER_COLUMNS: &str = "id, order_number, user_id, items, subtotal, delivery_fee, \
     discount_amount, total_amount, delivery_address, delivery_slot, status, payment_status, \
     payment_method, notes, tenant_id, created_at, updated_at";

/// Everything persisted for a new order, computed by the service beforehand
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub delivery_address: DeliveryAddress,
    pub delivery_slot: Option<ReservedWindow>,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub tenant_id: Option<Uuid>,
}

/// Repository for order documents
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    /// Create a new OrdersRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order with pending status and pending payment
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (order_number, user_id, items, subtotal, delivery_fee,
                                discount_amount, total_amount, delivery_address, delivery_slot,
                                payment_method, notes, tenant_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&new_order.order_number)
        .bind(new_order.user_id)
        .bind(Json(&new_order.items))
        .bind(new_order.subtotal)
        .bind(new_order.delivery_fee)
        .bind(new_order.discount_amount)
        .bind(new_order.total_amount)
        .bind(Json(&new_order.delivery_address))
        .bind(new_order.delivery_slot.as_ref().map(Json))
        .bind(new_order.payment_method)
        .bind(&new_order.notes)
        .bind(new_order.tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find an order owned by a specific user
    pub async fn find_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// List a user's orders newest first, with an optional status filter.
    /// Returns the page plus the total match count.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<OrderStatus>,
        params: PageParams,
    ) -> Result<(i64, Vec<Order>), OrderError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(status)
        .bind(i64::from(params.page_size))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, orders))
    }

    /// Admin listing across all users with optional status and payment filters
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
        params: PageParams,
    ) -> Result<(i64, Vec<Order>), OrderError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR payment_status = $2)
            "#,
        )
        .bind(status)
        .bind(payment_status)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR payment_status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status)
        .bind(payment_status)
        .bind(i64::from(params.page_size))
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, orders))
    }

    /// Update order status
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new_status)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(order)
    }
}
