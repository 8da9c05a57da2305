// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::cart::models::{
    AddCartItemRequest, CartLineQuery, CartResponse, UpdateCartItemRequest,
};
use crate::error::ApiError;
use crate::identity::AuthenticatedUser;

/// Handler for GET /api/v1/cart
/// Returns the user's cart (created empty on first access) with totals
pub async fn get_cart(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart_repo.get_or_create(user.user_id).await?;

    Ok(Json(cart.into()))
}

/// Handler for POST /api/v1/cart/items
/// Adds an item, snapshotting the product's current price and discount.
/// An existing line for the same (product, unit) pair merges quantities.
pub async fn add_cart_item(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    request.validate()?;

    let product = state
        .product_repo
        .find_by_id(request.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::NotFound {
            resource: "Product".to_string(),
            id: request.product_id.to_string(),
        })?;

    if !product.unit.supports(request.unit) {
        let available: Vec<String> = product
            .unit
            .available_units()
            .iter()
            .map(ToString::to_string)
            .collect();
        return Err(ApiError::BadRequest(format!(
            "Product only available in: {}",
            available.join(", ")
        )));
    }

    let cart = state.cart_repo.get_or_create(user.user_id).await?;
    let mut items = cart.items.0;

    match items
        .iter_mut()
        .find(|item| item.product_id == request.product_id && item.unit == request.unit)
    {
        Some(existing) => existing.quantity += request.quantity,
        None => items.push(crate::cart::models::CartItem {
            product_id: product.id,
            quantity: request.quantity,
            unit: request.unit,
            price_at_add: product.price,
            discount_at_add: product.discount,
        }),
    }

    let cart = state.cart_repo.save_items(user.user_id, &items).await?;

    tracing::debug!("Added product {} to cart for user {}", product.id, user.user_id);
    Ok(Json(cart.into()))
}

/// Handler for PUT /api/v1/cart/items/:product_id
/// Sets the quantity on an existing cart line
pub async fn update_cart_item(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    request.validate()?;

    let cart = state
        .cart_repo
        .find(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Cart".to_string(),
            id: user.user_id.to_string(),
        })?;

    let mut items = cart.items.0;
    let line = items
        .iter_mut()
        .find(|item| item.product_id == product_id && item.unit == request.unit)
        .ok_or_else(|| ApiError::NotFound {
            resource: "Cart item".to_string(),
            id: product_id.to_string(),
        })?;

    line.quantity = request.quantity;

    let cart = state.cart_repo.save_items(user.user_id, &items).await?;

    Ok(Json(cart.into()))
}

/// Handler for DELETE /api/v1/cart/items/:product_id?unit=
/// Removes a single cart line
pub async fn remove_cart_item(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Query(query): Query<CartLineQuery>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .cart_repo
        .find(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Cart".to_string(),
            id: user.user_id.to_string(),
        })?;

    let mut items = cart.items.0;
    let before = items.len();
    items.retain(|item| !(item.product_id == product_id && item.unit == query.unit));

    if items.len() == before {
        return Err(ApiError::NotFound {
            resource: "Cart item".to_string(),
            id: product_id.to_string(),
        });
    }

    let cart = state.cart_repo.save_items(user.user_id, &items).await?;

    Ok(Json(cart.into()))
}

/// Handler for DELETE /api/v1/cart
/// Empties the cart (the document itself survives)
pub async fn clear_cart(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CartResponse>, ApiError> {
    state.cart_repo.clear(user.user_id).await?;
    let cart = state.cart_repo.get_or_create(user.user_id).await?;

    Ok(Json(cart.into()))
}
