// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use validator::ValidationError;

fn time_pattern() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"))
}

/// Validates that a time window boundary is in "HH:MM" 24-hour format.
/// Slot lookup matches on exact string equality, so the format must be
/// normalized at the admin edge.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if time_pattern().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_time_format"))
    }
}

/// Validates that a monetary amount is non-negative
pub fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        Err(ValidationError::new("amount_must_be_non_negative"))
    } else {
        Ok(())
    }
}
