use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::products::models::Unit;
use crate::store_config::models::ReservedWindow;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum representing the payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        };
        write!(f, "{}", s)
    }
}

/// How the buyer pays for the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cod,
    Online,
    Upi,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cod
    }
}

/// A denormalized order line: the cart snapshot plus the product name copied
/// at creation time. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit: Unit,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
}

/// Delivery destination captured on the order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliveryAddress {
    #[validate(length(min = 1, message = "Address line1 is required"))]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Domain model representing an order document in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Json<Vec<OrderLine>>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub delivery_address: Json<DeliveryAddress>,
    pub delivery_slot: Option<Json<ReservedWindow>>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub tenant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested delivery window on order creation; end_time comes from the
/// matched configuration window, not the client
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverySlotRequest {
    pub date: DateTime<Utc>,
    pub start_time: String,
}

/// Request DTO for creating an order from the user's cart
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate]
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub delivery_slot: Option<DeliverySlotRequest>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub distance_km: Decimal,
}

/// Request DTO for the admin status update
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Query parameters for order listings
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Pagination window derived from raw query values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    /// Clamp raw query values: page is at least 1, page_size within
    /// min_size..=max_size
    pub fn clamped(
        page: Option<u32>,
        page_size: Option<u32>,
        min_size: u32,
        max_size: u32,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(min_size).clamp(min_size, max_size),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// Paginated order listing response
#[derive(Debug, Serialize)]
pub struct PagedOrders {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
    pub data: Vec<Order>,
}

impl PagedOrders {
    pub fn new(params: PageParams, total: i64, data: Vec<Order>) -> Self {
        let page_size = i64::from(params.page_size);
        Self {
            page: params.page,
            page_size: params.page_size,
            total,
            total_pages: (total + page_size - 1) / page_size,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::OutForDelivery.to_string(), "out_for_delivery");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
    }

    #[test]
    fn test_create_order_request_defaults() {
        let json = r#"{
            "delivery_address": {
                "line1": "14 FC Road",
                "city": "Pune",
                "state": "Maharashtra",
                "postal_code": "411004"
            }
        }"#;

        let request: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert!(request.delivery_slot.is_none());
        assert_eq!(request.payment_method, PaymentMethod::Cod);
        assert_eq!(request.notes, "");
        assert_eq!(request.distance_km, Decimal::ZERO);
    }

    #[test]
    fn test_delivery_address_validation() {
        use validator::Validate;

        let missing_line1 = DeliveryAddress {
            line1: String::new(),
            line2: String::new(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "411004".to_string(),
            latitude: None,
            longitude: None,
        };
        assert!(missing_line1.validate().is_err());
    }

    #[test]
    fn test_page_params_clamping() {
        let params = PageParams::clamped(None, None, 10, 50);
        assert_eq!(params, PageParams { page: 1, page_size: 10 });

        let params = PageParams::clamped(Some(0), Some(500), 10, 50);
        assert_eq!(params, PageParams { page: 1, page_size: 50 });

        let params = PageParams::clamped(Some(3), Some(5), 10, 50);
        assert_eq!(params, PageParams { page: 3, page_size: 10 });
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn test_paged_orders_total_pages() {
        let params = PageParams { page: 1, page_size: 10 };
        assert_eq!(PagedOrders::new(params, 0, vec![]).total_pages, 0);
        assert_eq!(PagedOrders::new(params, 10, vec![]).total_pages, 1);
        assert_eq!(PagedOrders::new(params, 11, vec![]).total_pages, 2);
    }
}
