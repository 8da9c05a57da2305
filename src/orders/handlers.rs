// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::identity::AuthenticatedUser;
use crate::orders::error::OrderError;
use crate::orders::models::{
    CreateOrderRequest, Order, OrderListQuery, PagedOrders, UpdateStatusRequest,
};

/// Handler for POST /api/v1/orders
/// Creates a new order from the authenticated user's cart
pub async fn create_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let order = state
        .order_service
        .create_order(user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET /api/v1/orders
/// Paginated order history for the authenticated user
pub async fn get_order_history_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<PagedOrders>, OrderError> {
    let orders = state
        .order_service
        .get_user_orders(user.user_id, query)
        .await?;

    Ok(Json(orders))
}

/// Handler for GET /api/v1/orders/:order_id
/// Retrieves a specific order owned by the authenticated user
pub async fn get_order_by_id_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .get_order(order_id, user.user_id)
        .await?;

    Ok(Json(order))
}

/// Handler for PATCH /api/v1/orders/:order_id/cancel
/// Cancels a pending or confirmed order and releases its delivery slot
pub async fn cancel_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .cancel_order(order_id, user.user_id)
        .await?;

    Ok(Json(order))
}

/// Handler for GET /api/v1/admin/orders
/// Paginated listing across all users (Admin)
pub async fn get_all_orders_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Query(query): Query<OrderListQuery>,
) -> Result<Json<PagedOrders>, OrderError> {
    let orders = state.order_service.get_all_orders(query).await?;

    Ok(Json(orders))
}

/// Handler for PATCH /api/v1/admin/orders/:order_id/status
/// Moves an order along the fulfilment chain (Admin)
pub async fn update_order_status_handler(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .update_order_status(order_id, request.status)
        .await?;

    Ok(Json(order))
}
