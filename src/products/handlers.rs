// HTTP handlers for catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::identity::AuthenticatedUser;
use crate::products::models::{CreateProductRequest, Product, UpdateProductRequest};

/// Query parameters for the product listing
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Include deactivated products (admin view)
    #[serde(default)]
    pub include_inactive: bool,
}

/// Handler for POST /api/v1/products
/// Creates a new catalog product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, description = "Invalid input data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    tracing::debug!("Creating new product: {}", payload.name);

    payload.validate()?;

    let product = state.product_repo.create(payload).await?;

    tracing::info!("Successfully created product with id: {}", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler for GET /api/v1/products
/// Retrieves the catalog (active products only unless include_inactive is set)
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated products")
    ),
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<crate::AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    tracing::debug!("Fetching products (include_inactive: {})", query.include_inactive);

    let products = state.product_repo.list(query.include_inactive).await?;

    tracing::debug!("Retrieved {} products", products.len());
    Ok(Json(products))
}

/// Handler for GET /api/v1/products/:id
/// Retrieves a specific product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn get_product_by_id(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Fetching product with id: {}", id);

    let product = state
        .product_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(product))
}

/// Handler for PUT /api/v1/products/:id
/// Partially updates an existing product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    tracing::debug!("Updating product with id: {}", id);

    payload.validate()?;

    let product = state.product_repo.update(id, payload).await?;

    tracing::info!("Successfully updated product with id: {}", id);
    Ok(Json(product))
}

/// Handler for DELETE /api/v1/products/:id
/// Deactivates a product (soft delete; order snapshots stay intact)
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deactivated"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deactivating product with id: {}", id);

    state.product_repo.deactivate(id).await?;

    tracing::info!("Successfully deactivated product with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}
