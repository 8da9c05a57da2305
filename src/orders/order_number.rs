use chrono::Utc;
use rand::Rng;

/// Generate a human-referenceable order number: "ORD" + creation timestamp in
/// milliseconds + a zero-padded 3-digit random suffix. The timestamp keeps
/// numbers roughly sortable; the suffix disambiguates same-millisecond
/// checkouts. The orders table still enforces uniqueness.
pub fn generate_order_number() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD{}{:03}", timestamp, random)
}
