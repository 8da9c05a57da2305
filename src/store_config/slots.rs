// Delivery slot reservation
//
// Operates on the delivery_slots array embedded in a StoreConfig document.
// Dates are truncated to UTC midnight on both sides of the comparison, and
// windows are matched on exact start_time string equality. Both rules are
// shared with slot seeding, so they must not diverge per call site.

use chrono::{DateTime, NaiveTime, Utc};

use crate::store_config::error::SlotError;
use crate::store_config::models::{ReservedWindow, StoreConfig, TimeWindow};

/// Service for guarded booked-counter mutation on delivery slots
pub struct SlotReservation;

impl SlotReservation {
    /// Truncate a timestamp to UTC midnight of the same calendar day
    pub fn normalize_date(date: DateTime<Utc>) -> DateTime<Utc> {
        date.date_naive().and_time(NaiveTime::MIN).and_utc()
    }

    /// Locate a window without mutating it. Used to validate availability
    /// (and capture end_time) before an order is persisted.
    pub fn find_window<'a>(
        config: &'a StoreConfig,
        date: DateTime<Utc>,
        start_time: &str,
    ) -> Result<&'a TimeWindow, SlotError> {
        let target = Self::normalize_date(date);

        let day = config
            .delivery_slots
            .iter()
            .find(|day| Self::normalize_date(day.date) == target)
            .ok_or(SlotError::DateNotFound)?;

        day.windows
            .iter()
            .find(|window| window.start_time == start_time)
            .ok_or(SlotError::WindowNotFound)
    }

    /// Reserve one unit of capacity in the matching window.
    ///
    /// Fails with `DateNotFound`/`WindowNotFound` when the slot cannot be
    /// located and `CapacityExceeded` when `booked >= capacity`; on success
    /// increments `booked` in place and returns the reserved window.
    pub fn reserve(
        config: &mut StoreConfig,
        date: DateTime<Utc>,
        start_time: &str,
    ) -> Result<ReservedWindow, SlotError> {
        let target = Self::normalize_date(date);

        let day = config
            .delivery_slots
            .iter_mut()
            .find(|day| Self::normalize_date(day.date) == target)
            .ok_or(SlotError::DateNotFound)?;

        let window = day
            .windows
            .iter_mut()
            .find(|window| window.start_time == start_time)
            .ok_or(SlotError::WindowNotFound)?;

        if window.booked >= window.capacity {
            return Err(SlotError::CapacityExceeded);
        }

        window.booked += 1;

        Ok(ReservedWindow {
            date: target,
            start_time: window.start_time.clone(),
            end_time: window.end_time.clone(),
        })
    }

    /// Release one unit of capacity in the matching window.
    ///
    /// Best-effort compensation: returns `true` when a booked count was
    /// decremented, `false` when the slot no longer exists or was already at
    /// zero. The counter never goes negative.
    pub fn release(config: &mut StoreConfig, date: DateTime<Utc>, start_time: &str) -> bool {
        let target = Self::normalize_date(date);

        let Some(day) = config
            .delivery_slots
            .iter_mut()
            .find(|day| Self::normalize_date(day.date) == target)
        else {
            return false;
        };

        let Some(window) = day
            .windows
            .iter_mut()
            .find(|window| window.start_time == start_time)
        else {
            return false;
        };

        if window.booked > 0 {
            window.booked -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_config::models::{
        DeliveryFeePolicy, SlotDay, StoreAddress,
    };
    use chrono::TimeZone;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn window(start: &str, end: &str, capacity: u32, booked: u32) -> TimeWindow {
        TimeWindow {
            start_time: start.to_string(),
            end_time: end.to_string(),
            capacity,
            booked,
        }
    }

    fn config_with_slots(days: Vec<SlotDay>) -> StoreConfig {
        StoreConfig {
            id: Uuid::new_v4(),
            tenant_id: None,
            store_address: Json(StoreAddress::default()),
            delivery_fee: Json(DeliveryFeePolicy::default()),
            cart_discounts: Json(vec![]),
            delivery_slots: Json(days),
            is_delivery_enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn march_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_truncates_time_of_day() {
        let afternoon = Utc.with_ymd_and_hms(2025, 3, 1, 15, 42, 7).unwrap();
        assert_eq!(SlotReservation::normalize_date(afternoon), march_first());
    }

    #[test]
    fn test_reserve_increments_booked() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 10, 3)],
        }]);

        let reserved = SlotReservation::reserve(&mut config, march_first(), "09:00").unwrap();
        assert_eq!(reserved.start_time, "09:00");
        assert_eq!(reserved.end_time, "11:00");
        assert_eq!(reserved.date, march_first());
        assert_eq!(config.delivery_slots[0].windows[0].booked, 4);
    }

    #[test]
    fn test_reserve_matches_normalized_dates() {
        // Stored date carries a time-of-day; request arrives mid-afternoon.
        // Both truncate to the same UTC midnight.
        let mut config = config_with_slots(vec![SlotDay {
            date: Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 0).unwrap(),
            windows: vec![window("09:00", "11:00", 10, 0)],
        }]);

        let request_date = Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap();
        let reserved = SlotReservation::reserve(&mut config, request_date, "09:00").unwrap();
        assert_eq!(reserved.date, march_first());
    }

    #[test]
    fn test_reserve_full_window_fails_without_mutation() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 1, 1)],
        }]);

        let err = SlotReservation::reserve(&mut config, march_first(), "09:00").unwrap_err();
        assert_eq!(err, SlotError::CapacityExceeded);
        assert_eq!(config.delivery_slots[0].windows[0].booked, 1);
    }

    #[test]
    fn test_reserve_unknown_date() {
        let mut config = config_with_slots(vec![]);
        let err = SlotReservation::reserve(&mut config, march_first(), "09:00").unwrap_err();
        assert_eq!(err, SlotError::DateNotFound);
    }

    #[test]
    fn test_reserve_unknown_window() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 10, 0)],
        }]);

        let err = SlotReservation::reserve(&mut config, march_first(), "11:00").unwrap_err();
        assert_eq!(err, SlotError::WindowNotFound);
    }

    #[test]
    fn test_window_match_is_exact_string_equality() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 10, 0)],
        }]);

        // "9:00" would parse to the same time of day but is not the same string
        let err = SlotReservation::reserve(&mut config, march_first(), "9:00").unwrap_err();
        assert_eq!(err, SlotError::WindowNotFound);
    }

    #[test]
    fn test_release_decrements_booked() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 10, 2)],
        }]);

        assert!(SlotReservation::release(&mut config, march_first(), "09:00"));
        assert_eq!(config.delivery_slots[0].windows[0].booked, 1);
    }

    #[test]
    fn test_release_never_goes_negative() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 10, 0)],
        }]);

        assert!(!SlotReservation::release(&mut config, march_first(), "09:00"));
        assert_eq!(config.delivery_slots[0].windows[0].booked, 0);
    }

    #[test]
    fn test_release_missing_slot_is_silent() {
        let mut config = config_with_slots(vec![]);
        assert!(!SlotReservation::release(&mut config, march_first(), "09:00"));
    }

    #[test]
    fn test_reserve_until_full_then_release_all() {
        let mut config = config_with_slots(vec![SlotDay {
            date: march_first(),
            windows: vec![window("09:00", "11:00", 3, 0)],
        }]);

        for _ in 0..3 {
            SlotReservation::reserve(&mut config, march_first(), "09:00").unwrap();
        }
        assert_eq!(
            SlotReservation::reserve(&mut config, march_first(), "09:00").unwrap_err(),
            SlotError::CapacityExceeded
        );

        for _ in 0..3 {
            assert!(SlotReservation::release(&mut config, march_first(), "09:00"));
        }
        assert!(!SlotReservation::release(&mut config, march_first(), "09:00"));
        assert_eq!(config.delivery_slots[0].windows[0].booked, 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::store_config::models::{DeliveryFeePolicy, SlotDay, StoreAddress};
    use chrono::TimeZone;
    use proptest::prelude::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    /// Any interleaving of reserve and release keeps every window's booked
    /// count within 0..=capacity
    #[test]
    fn prop_booked_stays_within_bounds() {
        proptest!(|(
            capacity in 1u32..=5,
            initial_booked in 0u32..=5,
            ops in prop::collection::vec(prop::bool::ANY, 0..=64)
        )| {
            let initial_booked = initial_booked.min(capacity);
            let date = Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap();

            let mut config = StoreConfig {
                id: Uuid::new_v4(),
                tenant_id: None,
                store_address: Json(StoreAddress::default()),
                delivery_fee: Json(DeliveryFeePolicy::default()),
                cart_discounts: Json(vec![]),
                delivery_slots: Json(vec![SlotDay {
                    date,
                    windows: vec![TimeWindow {
                        start_time: "09:00".to_string(),
                        end_time: "11:00".to_string(),
                        capacity,
                        booked: initial_booked,
                    }],
                }]),
                is_delivery_enabled: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };

            for reserve in ops {
                if reserve {
                    let _ = SlotReservation::reserve(&mut config, date, "09:00");
                } else {
                    let _ = SlotReservation::release(&mut config, date, "09:00");
                }

                let booked = config.delivery_slots[0].windows[0].booked;
                prop_assert!(booked <= capacity, "booked {} exceeded capacity {}", booked, capacity);
            }
        });
    }
}
