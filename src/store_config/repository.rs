use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store_config::error::{ConfigError, SlotError};
use crate::store_config::models::{
    DefaultDocument, ReservedWindow, SlotDay, StoreConfig, TimeWindow, UpdateStoreConfigRequest,
};
use crate::store_config::slots::SlotReservation;

const CONFIG_COLUMNS: &str = "id, tenant_id, store_address, delivery_fee, cart_discounts, \
     delivery_slots, is_delivery_enabled, created_at, updated_at";

/// Normalize a slot day's date to UTC midnight before storage, so stored and
/// requested dates always compare under the same truncation
fn normalize_day(mut day: SlotDay) -> SlotDay {
    day.date = SlotReservation::normalize_date(day.date);
    day
}

/// Default windows seeded for each new slot day
fn default_windows() -> Vec<TimeWindow> {
    [
        ("09:00", "11:00"),
        ("11:00", "13:00"),
        ("14:00", "16:00"),
        ("16:00", "18:00"),
    ]
    .iter()
    .map(|(start, end)| TimeWindow {
        start_time: (*start).to_string(),
        end_time: (*end).to_string(),
        capacity: 10,
        booked: 0,
    })
    .collect()
}

/// Repository owning the per-tenant configuration document.
///
/// All slot mutations are whole-document read-modify-write cycles executed
/// under a row lock, so concurrent reservations against the same tenant
/// serialize instead of overselling a window.
#[derive(Clone)]
pub struct StoreConfigRepository {
    pool: PgPool,
}

impl StoreConfigRepository {
    /// Create a new StoreConfigRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the configuration document for a tenant, if present
    pub async fn find(&self, tenant_id: Option<Uuid>) -> Result<Option<StoreConfig>, ConfigError> {
        let config = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM store_configs WHERE tenant_id IS NOT DISTINCT FROM $1"
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Fetch the tenant's configuration, creating the default document when
    /// none exists yet. The document is never deleted afterwards.
    pub async fn get_or_create(&self, tenant_id: Option<Uuid>) -> Result<StoreConfig, ConfigError> {
        if let Some(config) = self.find(tenant_id).await? {
            return Ok(config);
        }

        let defaults = DefaultDocument::new();

        let config = sqlx::query_as::<_, StoreConfig>(&format!(
            r#"
            INSERT INTO store_configs (tenant_id, store_address, delivery_fee, cart_discounts, delivery_slots)
            VALUES ($1, $2, $3, $4, '[]')
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(tenant_id)
        .bind(Json(&defaults.store_address))
        .bind(Json(&defaults.delivery_fee))
        .bind(Json(&defaults.cart_discounts))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Created default store configuration for tenant {:?}",
            tenant_id
        );
        Ok(config)
    }

    /// Wholesale replacement of the provided configuration sections.
    /// Omitted sections keep their stored values; upserts when the tenant has
    /// no document yet.
    pub async fn replace(
        &self,
        tenant_id: Option<Uuid>,
        request: UpdateStoreConfigRequest,
    ) -> Result<StoreConfig, ConfigError> {
        request.validate_sections()?;

        let existing = self.get_or_create(tenant_id).await?;

        let store_address = request
            .store_address
            .map(Json)
            .unwrap_or(existing.store_address);
        let delivery_fee = request
            .delivery_fee
            .map(Json)
            .unwrap_or(existing.delivery_fee);
        let cart_discounts = request
            .cart_discounts
            .map(Json)
            .unwrap_or(existing.cart_discounts);
        let delivery_slots = request
            .delivery_slots
            .map(|days| Json(days.into_iter().map(normalize_day).collect::<Vec<_>>()))
            .unwrap_or(existing.delivery_slots);

        let config = sqlx::query_as::<_, StoreConfig>(&format!(
            r#"
            UPDATE store_configs
            SET store_address = $1,
                delivery_fee = $2,
                cart_discounts = $3,
                delivery_slots = $4,
                is_delivery_enabled = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(store_address)
        .bind(delivery_fee)
        .bind(cart_discounts)
        .bind(delivery_slots)
        .bind(
            request
                .is_delivery_enabled
                .unwrap_or(existing.is_delivery_enabled),
        )
        .bind(existing.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(config)
    }

    /// Atomically reserve one unit of capacity in the matching window.
    ///
    /// Locks the config row for the duration of the read-modify-write, so two
    /// concurrent reservations for the last unit cannot both observe
    /// `booked < capacity`.
    pub async fn reserve_slot(
        &self,
        tenant_id: Option<Uuid>,
        date: DateTime<Utc>,
        start_time: &str,
    ) -> Result<(StoreConfig, ReservedWindow), SlotError> {
        let mut tx = self.pool.begin().await?;

        let mut config = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM store_configs WHERE tenant_id IS NOT DISTINCT FROM $1 FOR UPDATE"
        ))
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SlotError::ConfigNotFound)?;

        let reserved = SlotReservation::reserve(&mut config, date, start_time)?;

        sqlx::query("UPDATE store_configs SET delivery_slots = $1, updated_at = NOW() WHERE id = $2")
            .bind(Json(&config.delivery_slots.0))
            .bind(config.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((config, reserved))
    }

    /// Atomically release one unit of capacity in the matching window.
    ///
    /// Best-effort: returns Ok(false) when the config, date or window no
    /// longer exists, or the counter is already at zero.
    pub async fn release_slot(
        &self,
        tenant_id: Option<Uuid>,
        date: DateTime<Utc>,
        start_time: &str,
    ) -> Result<bool, ConfigError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut config) = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM store_configs WHERE tenant_id IS NOT DISTINCT FROM $1 FOR UPDATE"
        ))
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(false);
        };

        let released = SlotReservation::release(&mut config, date, start_time);

        if released {
            sqlx::query(
                "UPDATE store_configs SET delivery_slots = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(Json(&config.delivery_slots.0))
            .bind(config.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(released)
    }

    /// Append default delivery windows for the next `days` calendar days,
    /// skipping days already present. Dates are normalized to UTC midnight,
    /// the same truncation reservation matching uses.
    pub async fn append_slot_days(
        &self,
        tenant_id: Option<Uuid>,
        days: u32,
    ) -> Result<StoreConfig, ConfigError> {
        // Ensure the document exists before taking the row lock
        self.get_or_create(tenant_id).await?;

        let mut tx = self.pool.begin().await?;

        let mut config = sqlx::query_as::<_, StoreConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM store_configs WHERE tenant_id IS NOT DISTINCT FROM $1 FOR UPDATE"
        ))
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ConfigError::NotFound)?;

        let today = SlotReservation::normalize_date(Utc::now());
        let mut appended = 0;

        for offset in 0..days {
            let date = today + Duration::days(i64::from(offset));
            let exists = config
                .delivery_slots
                .iter()
                .any(|day| SlotReservation::normalize_date(day.date) == date);

            if !exists {
                config.delivery_slots.0.push(SlotDay {
                    date,
                    windows: default_windows(),
                });
                appended += 1;
            }
        }

        if appended > 0 {
            config.delivery_slots.0.sort_by_key(|day| day.date);

            sqlx::query(
                "UPDATE store_configs SET delivery_slots = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(Json(&config.delivery_slots.0))
            .bind(config.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Seeded {} slot day(s) for tenant {:?}", appended, tenant_id);
        Ok(config)
    }
}
