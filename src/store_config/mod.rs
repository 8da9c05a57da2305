// Store configuration module
//
// Owns the per-tenant configuration document: delivery-fee policy, cart
// discount tiers, and capacity-bounded delivery slots. The pricing engine and
// slot reservation logic both operate on snapshots of this document.

pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod slots;

pub use error::{ConfigError, SlotError};
pub use handlers::*;
pub use models::*;
pub use pricing::PricingEngine;
pub use repository::StoreConfigRepository;
pub use slots::SlotReservation;
