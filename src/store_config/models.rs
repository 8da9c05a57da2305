use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::store_config::error::ConfigError;
use crate::validation::validate_time_of_day;

/// Physical store address embedded in the configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreAddress {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "StoreAddress::default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl StoreAddress {
    fn default_country() -> String {
        "India".to_string()
    }
}

impl Default for StoreAddress {
    fn default() -> Self {
        Self {
            line1: String::new(),
            line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: Self::default_country(),
            latitude: None,
            longitude: None,
        }
    }
}

/// How the delivery fee is computed for an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryFeePolicy {
    /// Same fee for every delivery
    Flat { base_fee: Decimal },
    /// Base fee plus a per-kilometre rate
    PerKm { base_fee: Decimal, rate: Decimal },
}

impl DeliveryFeePolicy {
    /// Invariant checks for a stored policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DeliveryFeePolicy::Flat { base_fee } => {
                if *base_fee < Decimal::ZERO {
                    return Err(ConfigError::InvalidConfig(
                        "Delivery base fee cannot be negative".to_string(),
                    ));
                }
            }
            DeliveryFeePolicy::PerKm { base_fee, rate } => {
                if *base_fee < Decimal::ZERO || *rate < Decimal::ZERO {
                    return Err(ConfigError::InvalidConfig(
                        "Delivery fee components cannot be negative".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for DeliveryFeePolicy {
    fn default() -> Self {
        DeliveryFeePolicy::Flat {
            base_fee: Decimal::from(50),
        }
    }
}

/// A single cart discount rule. Multiple tiers may match the same cart value;
/// selection picks highest priority, then highest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "discount_type", rename_all = "snake_case")]
pub enum DiscountTier {
    Flat {
        min_cart_value: Decimal,
        value: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_discount_amount: Option<Decimal>,
        #[serde(default)]
        priority: i32,
    },
    Percentage {
        min_cart_value: Decimal,
        value: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_discount_amount: Option<Decimal>,
        #[serde(default)]
        priority: i32,
    },
}

impl DiscountTier {
    pub fn min_cart_value(&self) -> Decimal {
        match self {
            DiscountTier::Flat { min_cart_value, .. }
            | DiscountTier::Percentage { min_cart_value, .. } => *min_cart_value,
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            DiscountTier::Flat { value, .. } | DiscountTier::Percentage { value, .. } => *value,
        }
    }

    pub fn max_discount_amount(&self) -> Option<Decimal> {
        match self {
            DiscountTier::Flat {
                max_discount_amount, ..
            }
            | DiscountTier::Percentage {
                max_discount_amount, ..
            } => *max_discount_amount,
        }
    }

    pub fn priority(&self) -> i32 {
        match self {
            DiscountTier::Flat { priority, .. } | DiscountTier::Percentage { priority, .. } => {
                *priority
            }
        }
    }

    /// Invariant checks for a stored tier
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_cart_value() < Decimal::ZERO {
            return Err(ConfigError::InvalidConfig(
                "Discount min_cart_value cannot be negative".to_string(),
            ));
        }
        if self.value() < Decimal::ZERO {
            return Err(ConfigError::InvalidConfig(
                "Discount value cannot be negative".to_string(),
            ));
        }
        if let Some(cap) = self.max_discount_amount() {
            if cap < Decimal::ZERO {
                return Err(ConfigError::InvalidConfig(
                    "Discount cap cannot be negative".to_string(),
                ));
            }
        }
        if let DiscountTier::Percentage { value, .. } = self {
            if *value > Decimal::from(100) {
                return Err(ConfigError::InvalidConfig(
                    "Percentage discount cannot exceed 100%".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A capacity-bounded delivery window within a slot day.
/// `start_time`/`end_time` are "HH:MM" strings; slot lookup matches
/// `start_time` by exact string equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_time: String,
    pub end_time: String,
    pub capacity: u32,
    #[serde(default)]
    pub booked: u32,
}

impl TimeWindow {
    /// Invariant checks for a stored window
    pub fn validate(&self) -> Result<(), ConfigError> {
        if validate_time_of_day(&self.start_time).is_err()
            || validate_time_of_day(&self.end_time).is_err()
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid time window '{}-{}': expected HH:MM",
                self.start_time, self.end_time
            )));
        }
        if self.capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Slot capacity must be at least 1".to_string(),
            ));
        }
        if self.booked > self.capacity {
            return Err(ConfigError::InvalidConfig(format!(
                "Slot {} booked count {} exceeds capacity {}",
                self.start_time, self.booked, self.capacity
            )));
        }
        Ok(())
    }
}

/// All delivery windows for one calendar day. The date is normalized to
/// UTC midnight when written and when matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDay {
    pub date: DateTime<Utc>,
    pub windows: Vec<TimeWindow>,
}

/// The per-tenant configuration document. At most one per tenant; the
/// null-tenant document serves single-store deployments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoreConfig {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub store_address: Json<StoreAddress>,
    pub delivery_fee: Json<DeliveryFeePolicy>,
    pub cart_discounts: Json<Vec<DiscountTier>>,
    pub delivery_slots: Json<Vec<SlotDay>>,
    pub is_delivery_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default document contents created lazily on first read for a tenant
pub struct DefaultDocument {
    pub store_address: StoreAddress,
    pub delivery_fee: DeliveryFeePolicy,
    pub cart_discounts: Vec<DiscountTier>,
}

impl DefaultDocument {
    pub fn new() -> Self {
        Self {
            store_address: StoreAddress {
                line1: "12 MG Road".to_string(),
                city: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                postal_code: "411001".to_string(),
                ..StoreAddress::default()
            },
            delivery_fee: DeliveryFeePolicy::default(),
            cart_discounts: vec![DiscountTier::Flat {
                min_cart_value: Decimal::from(1000),
                value: Decimal::from(100),
                max_discount_amount: None,
                priority: 10,
            }],
        }
    }
}

impl Default for DefaultDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Request DTO for wholesale configuration replacement. Omitted sections keep
/// their stored values; tenant_id is immutable.
#[derive(Debug, Deserialize)]
pub struct UpdateStoreConfigRequest {
    pub store_address: Option<StoreAddress>,
    pub delivery_fee: Option<DeliveryFeePolicy>,
    pub cart_discounts: Option<Vec<DiscountTier>>,
    pub delivery_slots: Option<Vec<SlotDay>>,
    pub is_delivery_enabled: Option<bool>,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

impl UpdateStoreConfigRequest {
    /// Validate every provided section before persisting
    pub fn validate_sections(&self) -> Result<(), ConfigError> {
        if let Some(ref fee) = self.delivery_fee {
            fee.validate()?;
        }
        if let Some(ref tiers) = self.cart_discounts {
            for tier in tiers {
                tier.validate()?;
            }
        }
        if let Some(ref days) = self.delivery_slots {
            for day in days {
                for window in &day.windows {
                    window.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Request DTO for the pre-checkout quote endpoint
#[derive(Debug, Deserialize)]
pub struct ComputeQuoteRequest {
    pub cart_value: Decimal,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

/// Request DTO for direct slot reservation
#[derive(Debug, Deserialize)]
pub struct ReserveSlotRequest {
    pub date: DateTime<Utc>,
    pub start_time: String,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

/// Request DTO for seeding default delivery slot days
#[derive(Debug, Deserialize)]
pub struct SeedSlotsRequest {
    #[serde(default = "SeedSlotsRequest::default_days")]
    pub days: u32,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

impl SeedSlotsRequest {
    fn default_days() -> u32 {
        30
    }
}

/// The window actually reserved, denormalized onto the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedWindow {
    pub date: DateTime<Utc>,
    pub start_time: String,
    pub end_time: String,
}

/// Result of a pricing computation over a config snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub cart_value: Decimal,
    pub delivery_fee: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub applied_discount_rule: Option<DiscountTier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_delivery_fee_policy_json_shape() {
        let flat = DeliveryFeePolicy::Flat {
            base_fee: dec!(50),
        };
        let json = serde_json::to_value(&flat).unwrap();
        assert_eq!(json["type"], "flat");
        assert_eq!(json["base_fee"], serde_json::json!("50"));

        let per_km: DeliveryFeePolicy =
            serde_json::from_str(r#"{"type":"per_km","base_fee":30,"rate":10}"#).unwrap();
        assert_eq!(
            per_km,
            DeliveryFeePolicy::PerKm {
                base_fee: dec!(30),
                rate: dec!(10)
            }
        );
    }

    #[test]
    fn test_discount_tier_json_shape() {
        let tier: DiscountTier = serde_json::from_str(
            r#"{"discount_type":"percentage","min_cart_value":1000,"value":15,"max_discount_amount":300,"priority":20}"#,
        )
        .unwrap();
        assert_eq!(
            tier,
            DiscountTier::Percentage {
                min_cart_value: dec!(1000),
                value: dec!(15),
                max_discount_amount: Some(dec!(300)),
                priority: 20,
            }
        );

        // priority and cap are optional on the wire
        let tier: DiscountTier =
            serde_json::from_str(r#"{"discount_type":"flat","min_cart_value":500,"value":50}"#)
                .unwrap();
        assert_eq!(tier.priority(), 0);
        assert_eq!(tier.max_discount_amount(), None);
    }

    #[test]
    fn test_tier_validation() {
        let ok = DiscountTier::Flat {
            min_cart_value: dec!(1000),
            value: dec!(100),
            max_discount_amount: None,
            priority: 10,
        };
        assert!(ok.validate().is_ok());

        let over_hundred = DiscountTier::Percentage {
            min_cart_value: dec!(0),
            value: dec!(120),
            max_discount_amount: None,
            priority: 0,
        };
        assert!(over_hundred.validate().is_err());

        let negative = DiscountTier::Flat {
            min_cart_value: dec!(-1),
            value: dec!(10),
            max_discount_amount: None,
            priority: 0,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_window_validation() {
        let ok = TimeWindow {
            start_time: "09:00".to_string(),
            end_time: "11:00".to_string(),
            capacity: 10,
            booked: 3,
        };
        assert!(ok.validate().is_ok());

        let bad_time = TimeWindow {
            start_time: "9am".to_string(),
            ..ok.clone()
        };
        assert!(bad_time.validate().is_err());

        let zero_capacity = TimeWindow {
            capacity: 0,
            booked: 0,
            ..ok.clone()
        };
        assert!(zero_capacity.validate().is_err());

        let overbooked = TimeWindow {
            capacity: 2,
            booked: 3,
            ..ok
        };
        assert!(overbooked.validate().is_err());
    }

    #[test]
    fn test_fee_policy_validation() {
        assert!(DeliveryFeePolicy::Flat { base_fee: dec!(0) }.validate().is_ok());
        assert!(DeliveryFeePolicy::Flat {
            base_fee: dec!(-1)
        }
        .validate()
        .is_err());
        assert!(DeliveryFeePolicy::PerKm {
            base_fee: dec!(30),
            rate: dec!(-2)
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_default_document() {
        let doc = DefaultDocument::new();
        assert_eq!(
            doc.delivery_fee,
            DeliveryFeePolicy::Flat {
                base_fee: dec!(50)
            }
        );
        assert_eq!(doc.cart_discounts.len(), 1);
        assert_eq!(doc.cart_discounts[0].min_cart_value(), dec!(1000));
        assert_eq!(doc.cart_discounts[0].value(), dec!(100));
        assert_eq!(doc.cart_discounts[0].priority(), 10);
        assert_eq!(doc.store_address.city, "Pune");
    }
}
