// HTTP handlers for store configuration endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::identity::AuthenticatedUser;
use crate::store_config::error::{ConfigError, SlotError};
use crate::store_config::models::{
    ComputeQuoteRequest, Quote, ReserveSlotRequest, SeedSlotsRequest, StoreConfig,
    UpdateStoreConfigRequest,
};
use crate::store_config::pricing::PricingEngine;

/// Query parameters selecting a tenant's configuration
#[derive(Debug, Deserialize)]
pub struct TenantQuery {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

/// Handler for GET /api/v1/storeconfig
/// Returns the tenant's configuration, creating the default document on first read
pub async fn get_store_config(
    State(state): State<crate::AppState>,
    Query(query): Query<TenantQuery>,
) -> Result<Json<StoreConfig>, ConfigError> {
    let config = state.config_repo.get_or_create(query.tenant_id).await?;

    Ok(Json(config))
}

/// Handler for PUT /api/v1/storeconfig
/// Wholesale replacement of the provided configuration sections
pub async fn update_store_config(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Json(request): Json<UpdateStoreConfigRequest>,
) -> Result<Json<StoreConfig>, ConfigError> {
    let tenant_id = request.tenant_id;
    let config = state.config_repo.replace(tenant_id, request).await?;

    tracing::info!("Store configuration replaced for tenant {:?}", tenant_id);
    Ok(Json(config))
}

/// Handler for POST /api/v1/storeconfig/compute
/// Pre-checkout estimation: prices a cart value against the current
/// configuration without touching any state
pub async fn compute_quote(
    State(state): State<crate::AppState>,
    Json(request): Json<ComputeQuoteRequest>,
) -> Result<Json<Quote>, ConfigError> {
    let config = state.config_repo.get_or_create(request.tenant_id).await?;

    let quote = PricingEngine::compute(request.cart_value, request.distance_km, &config)?;

    Ok(Json(quote))
}

/// Handler for POST /api/v1/storeconfig/reserve-slot
/// Reserves a delivery window independently of order creation
/// (pre-booking flows)
pub async fn reserve_slot(
    State(state): State<crate::AppState>,
    Json(request): Json<ReserveSlotRequest>,
) -> Result<Json<StoreConfig>, SlotError> {
    let (config, reserved) = state
        .config_repo
        .reserve_slot(request.tenant_id, request.date, &request.start_time)
        .await?;

    tracing::info!(
        "Reserved slot {} on {} for tenant {:?}",
        reserved.start_time,
        reserved.date.date_naive(),
        request.tenant_id
    );
    Ok(Json(config))
}

/// Handler for POST /api/v1/storeconfig/slots/seed
/// Appends default delivery windows for the next N days
pub async fn seed_slots(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser, // TODO: Add role check once the auth gateway exposes roles
    Json(request): Json<SeedSlotsRequest>,
) -> Result<Json<StoreConfig>, ConfigError> {
    let config = state
        .config_repo
        .append_slot_days(request.tenant_id, request.days)
        .await?;

    Ok(Json(config))
}
