// Pricing engine
//
// Pure computation over a StoreConfig snapshot: delivery fee from the fee
// policy, discount from the best-matching tier, final amount floored at zero.
// No side effects; the same snapshot and inputs always produce the same quote.

use rust_decimal::Decimal;

use crate::store_config::error::ConfigError;
use crate::store_config::models::{DeliveryFeePolicy, DiscountTier, Quote, StoreConfig};

/// Service computing checkout totals from a configuration snapshot
pub struct PricingEngine;

impl PricingEngine {
    /// Compute delivery fee, discount and final amount for a cart.
    ///
    /// # Arguments
    /// * `cart_value` - Non-negative cart subtotal
    /// * `distance_km` - Non-negative delivery distance
    /// * `config` - Configuration snapshot to price against
    ///
    /// Tier selection: filter tiers whose `min_cart_value` is met, sort by
    /// priority descending then value descending, take the first. The raw
    /// discount is clamped to the tier's cap when one is set. Final amount is
    /// `max(0, cart_value - discount + delivery_fee)`.
    ///
    /// Malformed configuration is a `ConfigError`, never a silent default.
    pub fn compute(
        cart_value: Decimal,
        distance_km: Decimal,
        config: &StoreConfig,
    ) -> Result<Quote, ConfigError> {
        if cart_value < Decimal::ZERO {
            return Err(ConfigError::InvalidConfig(
                "cart_value cannot be negative".to_string(),
            ));
        }
        if distance_km < Decimal::ZERO {
            return Err(ConfigError::InvalidConfig(
                "distance_km cannot be negative".to_string(),
            ));
        }

        let delivery_fee = Self::delivery_fee(&config.delivery_fee, distance_km)?;

        let applied = Self::select_tier(&config.cart_discounts, cart_value)?;
        let discount_amount = applied
            .map(|tier| Self::discount_amount(tier, cart_value))
            .unwrap_or(Decimal::ZERO);

        let final_amount = (cart_value - discount_amount + delivery_fee).max(Decimal::ZERO);

        Ok(Quote {
            cart_value,
            delivery_fee,
            discount_amount,
            final_amount,
            applied_discount_rule: applied.cloned(),
        })
    }

    /// Delivery fee under the configured policy
    fn delivery_fee(
        policy: &DeliveryFeePolicy,
        distance_km: Decimal,
    ) -> Result<Decimal, ConfigError> {
        policy.validate()?;

        let fee = match policy {
            DeliveryFeePolicy::Flat { base_fee } => *base_fee,
            DeliveryFeePolicy::PerKm { base_fee, rate } => *base_fee + *rate * distance_km,
        };

        Ok(fee)
    }

    /// Select the applicable tier: highest priority wins, ties broken by
    /// highest value. Deterministic regardless of the stored tier order.
    fn select_tier(
        tiers: &[DiscountTier],
        cart_value: Decimal,
    ) -> Result<Option<&DiscountTier>, ConfigError> {
        for tier in tiers {
            tier.validate()?;
        }

        let mut applicable: Vec<&DiscountTier> = tiers
            .iter()
            .filter(|tier| cart_value >= tier.min_cart_value())
            .collect();

        applicable.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| b.value().cmp(&a.value()))
        });

        Ok(applicable.first().copied())
    }

    /// Raw tier discount, clamped to the tier's cap when present
    fn discount_amount(tier: &DiscountTier, cart_value: Decimal) -> Decimal {
        let raw = match tier {
            DiscountTier::Flat { value, .. } => *value,
            DiscountTier::Percentage { value, .. } => cart_value * *value / Decimal::from(100),
        };

        match tier.max_discount_amount() {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::store_config::models::StoreAddress;
    use chrono::Utc;
    use proptest::prelude::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn config_with(tiers: Vec<DiscountTier>, base_fee_cents: u32) -> StoreConfig {
        StoreConfig {
            id: Uuid::new_v4(),
            tenant_id: None,
            store_address: Json(StoreAddress::default()),
            delivery_fee: Json(DeliveryFeePolicy::Flat {
                base_fee: Decimal::from(base_fee_cents) / Decimal::from(100),
            }),
            cart_discounts: Json(tiers),
            delivery_slots: Json(vec![]),
            is_delivery_enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn arb_tier() -> impl Strategy<Value = DiscountTier> {
        (
            0u32..=500_000,
            0u32..=10_000,
            prop::option::of(0u32..=50_000),
            0i32..=100,
            prop::bool::ANY,
        )
            .prop_map(|(min_cents, value_raw, cap_cents, priority, percentage)| {
                let min_cart_value = Decimal::from(min_cents) / Decimal::from(100);
                let max_discount_amount =
                    cap_cents.map(|c| Decimal::from(c) / Decimal::from(100));
                if percentage {
                    DiscountTier::Percentage {
                        min_cart_value,
                        // keep percentages within the valid 0-100 range
                        value: Decimal::from(value_raw % 101),
                        max_discount_amount,
                        priority,
                    }
                } else {
                    DiscountTier::Flat {
                        min_cart_value,
                        value: Decimal::from(value_raw) / Decimal::from(100),
                        max_discount_amount,
                        priority,
                    }
                }
            })
    }

    /// Final amount always equals the formula and is never negative
    #[test]
    fn prop_final_amount_matches_formula() {
        proptest!(|(
            cart_cents in 0u32..=1_000_000,
            fee_cents in 0u32..=50_000,
            tiers in prop::collection::vec(arb_tier(), 0..=8)
        )| {
            let cart_value = Decimal::from(cart_cents) / Decimal::from(100);
            let config = config_with(tiers, fee_cents);

            let quote = PricingEngine::compute(cart_value, Decimal::ZERO, &config).unwrap();

            let expected = (cart_value - quote.discount_amount + quote.delivery_fee)
                .max(Decimal::ZERO);
            prop_assert_eq!(quote.final_amount, expected);
            prop_assert!(quote.final_amount >= Decimal::ZERO);
        });
    }

    /// The selected (priority, value) pair is invariant under permutation of
    /// the stored array; tiers fully tied on both keys are interchangeable.
    #[test]
    fn prop_selection_is_order_independent() {
        proptest!(|(
            cart_cents in 0u32..=1_000_000,
            tiers in prop::collection::vec(arb_tier(), 1..=8)
        )| {
            let cart_value = Decimal::from(cart_cents) / Decimal::from(100);

            let forward = config_with(tiers.clone(), 0);
            let reversed = config_with(tiers.into_iter().rev().collect(), 0);

            let a = PricingEngine::compute(cart_value, Decimal::ZERO, &forward).unwrap();
            let b = PricingEngine::compute(cart_value, Decimal::ZERO, &reversed).unwrap();

            let key = |quote: &Quote| {
                quote
                    .applied_discount_rule
                    .as_ref()
                    .map(|tier| (tier.priority(), tier.value()))
            };
            prop_assert_eq!(key(&a), key(&b));
        });
    }

    /// A capped tier never discounts beyond its cap
    #[test]
    fn prop_discount_respects_cap() {
        proptest!(|(
            cart_cents in 0u32..=1_000_000,
            tiers in prop::collection::vec(arb_tier(), 0..=8)
        )| {
            let cart_value = Decimal::from(cart_cents) / Decimal::from(100);
            let config = config_with(tiers, 0);

            let quote = PricingEngine::compute(cart_value, Decimal::ZERO, &config).unwrap();

            if let Some(ref rule) = quote.applied_discount_rule {
                if let Some(cap) = rule.max_discount_amount() {
                    prop_assert!(quote.discount_amount <= cap);
                }
            }
        });
    }
}
