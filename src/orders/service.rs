use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cart::models::CartItem;
use crate::cart::repository::CartRepository;
use crate::orders::error::OrderError;
use crate::orders::models::{
    CreateOrderRequest, Order, OrderLine, OrderListQuery, OrderStatus, PagedOrders, PageParams,
};
use crate::orders::order_number::generate_order_number;
use crate::orders::repository::{NewOrder, OrdersRepository};
use crate::orders::status_machine::StatusMachine;
use crate::products::models::Product;
use crate::products::repository::ProductRepository;
use crate::store_config::models::ReservedWindow;
use crate::store_config::pricing::PricingEngine;
use crate::store_config::repository::StoreConfigRepository;
use crate::store_config::slots::SlotReservation;

/// Build immutable order lines from the cart snapshot.
///
/// Prices and discounts come from the cart (captured at add time); the product
/// name is copied from the live record at this moment. Fails when any
/// referenced product is missing or no longer active.
pub fn build_order_lines(
    cart_items: &[CartItem],
    products: &HashMap<Uuid, Product>,
) -> Result<(Vec<OrderLine>, Decimal), OrderError> {
    let mut lines = Vec::with_capacity(cart_items.len());
    let mut subtotal = Decimal::ZERO;

    for item in cart_items {
        let product = products
            .get(&item.product_id)
            .filter(|p| p.is_active)
            .ok_or(OrderError::InactiveProduct)?;

        let line_total = item.line_total();
        subtotal += line_total;

        lines.push(OrderLine {
            product_id: item.product_id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            unit: item.unit,
            price: item.price_at_add,
            discount: item.discount_at_add,
            total: line_total,
        });
    }

    Ok((lines, subtotal))
}

/// Service orchestrating order assembly: cart snapshot, pricing, slot
/// reservation, persistence and cart clearing
#[derive(Clone)]
pub struct OrderService {
    orders_repo: OrdersRepository,
    cart_repo: CartRepository,
    product_repo: ProductRepository,
    config_repo: StoreConfigRepository,
}

impl OrderService {
    /// Create a new OrderService
    pub fn new(
        orders_repo: OrdersRepository,
        cart_repo: CartRepository,
        product_repo: ProductRepository,
        config_repo: StoreConfigRepository,
    ) -> Self {
        Self {
            orders_repo,
            cart_repo,
            product_repo,
            config_repo,
        }
    }

    /// Create an order from the user's cart.
    ///
    /// Order of operations matters for failure semantics:
    /// 1. Reject on empty cart
    /// 2. Reject when any referenced product is inactive (live check)
    /// 3. Build line items and subtotal from the cart snapshot
    /// 4. Price against the current configuration
    /// 5. Validate the requested slot window (no mutation yet); any failure
    ///    aborts with nothing persisted
    /// 6. Persist the order
    /// 7. Only after the order is durable: book the slot and clear the cart
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        let cart = self.cart_repo.get_or_create(user_id).await?;
        if cart.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let product_ids: Vec<Uuid> = cart.items.iter().map(|item| item.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .product_repo
            .find_by_ids(&product_ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let (lines, subtotal) = build_order_lines(&cart.items, &products)?;

        let config = self.config_repo.get_or_create(cart.tenant_id).await?;
        let quote = PricingEngine::compute(subtotal, request.distance_km, &config)?;

        // Validate slot availability against the snapshot before persisting;
        // the booked counter is only incremented once the order is durable
        let reserved_slot: Option<ReservedWindow> = match &request.delivery_slot {
            Some(slot) => {
                let window = SlotReservation::find_window(&config, slot.date, &slot.start_time)?;
                if window.booked >= window.capacity {
                    return Err(crate::store_config::error::SlotError::CapacityExceeded.into());
                }
                Some(ReservedWindow {
                    date: SlotReservation::normalize_date(slot.date),
                    start_time: window.start_time.clone(),
                    end_time: window.end_time.clone(),
                })
            }
            None => None,
        };

        let order = self
            .orders_repo
            .create(NewOrder {
                order_number: generate_order_number(),
                user_id,
                items: lines,
                subtotal,
                delivery_fee: quote.delivery_fee,
                discount_amount: quote.discount_amount,
                total_amount: quote.final_amount,
                delivery_address: request.delivery_address,
                delivery_slot: reserved_slot.clone(),
                payment_method: request.payment_method,
                notes: request.notes,
                tenant_id: cart.tenant_id,
            })
            .await?;

        if let Some(ref slot) = reserved_slot {
            // A concurrent checkout may have taken the last unit between the
            // availability check and here; the guarded increment refuses to
            // push booked past capacity, and the order stands either way.
            match self
                .config_repo
                .reserve_slot(cart.tenant_id, slot.date, &slot.start_time)
                .await
            {
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "Order {} created but slot {} on {} could not be booked: {}",
                        order.order_number,
                        slot.start_time,
                        slot.date.date_naive(),
                        e
                    );
                }
            }
        }

        self.cart_repo.clear(user_id).await?;

        tracing::info!(
            "Order {} created for user {} (total {})",
            order.order_number,
            user_id,
            order.total_amount
        );
        Ok(order)
    }

    /// Cancel an order owned by the user.
    ///
    /// Allowed only from pending or confirmed. Releasing the delivery slot is
    /// best-effort compensation: if the configuration changed and the slot no
    /// longer exists, cancellation still succeeds.
    pub async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, OrderError> {
        let order = self
            .orders_repo
            .find_for_user(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !StatusMachine::can_cancel(order.status) {
            return Err(OrderError::InvalidTransition(
                "Order cannot be cancelled at this stage".to_string(),
            ));
        }

        let cancelled = self
            .orders_repo
            .update_status(order_id, OrderStatus::Cancelled)
            .await?;

        if let Some(ref slot) = order.delivery_slot {
            match self
                .config_repo
                .release_slot(order.tenant_id, slot.date, &slot.start_time)
                .await
            {
                Ok(true) => {
                    tracing::debug!(
                        "Released slot {} on {} for cancelled order {}",
                        slot.start_time,
                        slot.date.date_naive(),
                        cancelled.order_number
                    );
                }
                Ok(false) => {
                    tracing::debug!(
                        "Slot {} on {} no longer present; skipping release for order {}",
                        slot.start_time,
                        slot.date.date_naive(),
                        cancelled.order_number
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to release slot for cancelled order {}: {}",
                        cancelled.order_number,
                        e
                    );
                }
            }
        }

        tracing::info!("Order {} cancelled by user {}", cancelled.order_number, user_id);
        Ok(cancelled)
    }

    /// Get a user's order by ID
    pub async fn get_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, OrderError> {
        self.orders_repo
            .find_for_user(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Paginated listing of the user's orders, newest first
    pub async fn get_user_orders(
        &self,
        user_id: Uuid,
        query: OrderListQuery,
    ) -> Result<PagedOrders, OrderError> {
        let params = PageParams::clamped(query.page, query.page_size, 10, 50);
        let (total, orders) = self
            .orders_repo
            .list_for_user(user_id, query.status, params)
            .await?;

        Ok(PagedOrders::new(params, total, orders))
    }

    /// Admin listing across all users
    pub async fn get_all_orders(&self, query: OrderListQuery) -> Result<PagedOrders, OrderError> {
        let params = PageParams::clamped(query.page, query.page_size, 10, 100);
        let (total, orders) = self
            .orders_repo
            .list_all(query.status, query.payment_status, params)
            .await?;

        Ok(PagedOrders::new(params, total, orders))
    }

    /// Admin status update, validated by the status machine
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders_repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        StatusMachine::transition(order.status, new_status)
            .map_err(OrderError::InvalidTransition)?;

        let updated = self.orders_repo.update_status(order_id, new_status).await?;

        tracing::info!(
            "Order {} moved from {} to {}",
            updated.order_number,
            order.status,
            new_status
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::models::{ProductUnit, Unit};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sqlx::types::Json;

    fn product(id: Uuid, name: &str, is_active: bool) -> Product {
        Product {
            id,
            name: name.to_string(),
            mrp: dec!(550),
            price: dec!(500),
            discount: dec!(50),
            unit: ProductUnit::Both,
            description: String::new(),
            images: Json(vec![]),
            is_active,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_item(product_id: Uuid, quantity: i32, price: Decimal, discount: Decimal) -> CartItem {
        CartItem {
            product_id,
            quantity,
            unit: Unit::Box,
            price_at_add: price,
            discount_at_add: discount,
        }
    }

    #[test]
    fn test_build_order_lines_snapshots_cart_prices() {
        let id = Uuid::new_v4();
        let mut products = HashMap::new();
        // Live price differs from the snapshot; the snapshot wins
        products.insert(id, product(id, "Kaju Katli", true));

        let items = vec![cart_item(id, 2, dec!(450), dec!(25))];
        let (lines, subtotal) = build_order_lines(&items, &products).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_name, "Kaju Katli");
        assert_eq!(lines[0].price, dec!(450));
        assert_eq!(lines[0].discount, dec!(25));
        assert_eq!(lines[0].total, dec!(850));
        assert_eq!(subtotal, dec!(850));
    }

    #[test]
    fn test_build_order_lines_sums_subtotal() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut products = HashMap::new();
        products.insert(a, product(a, "Kaju Katli", true));
        products.insert(b, product(b, "Motichoor Laddu", true));

        let items = vec![
            cart_item(a, 2, dec!(500), dec!(0)),
            cart_item(b, 3, dec!(120), dec!(20)),
        ];
        let (lines, subtotal) = build_order_lines(&items, &products).unwrap();

        assert_eq!(lines.len(), 2);
        // 2*500 + 3*(120-20)
        assert_eq!(subtotal, dec!(1300));
    }

    #[test]
    fn test_build_order_lines_rejects_inactive_product() {
        let id = Uuid::new_v4();
        let mut products = HashMap::new();
        products.insert(id, product(id, "Discontinued", false));

        let items = vec![cart_item(id, 1, dec!(100), dec!(0))];
        let err = build_order_lines(&items, &products).unwrap_err();
        assert!(matches!(err, OrderError::InactiveProduct));
    }

    #[test]
    fn test_build_order_lines_rejects_missing_product() {
        let items = vec![cart_item(Uuid::new_v4(), 1, dec!(100), dec!(0))];
        let err = build_order_lines(&items, &HashMap::new()).unwrap_err();
        assert!(matches!(err, OrderError::InactiveProduct));
    }

    #[test]
    fn test_totals_recombine_exactly() {
        // total_amount stored on the order must equal the formula over its
        // stored components
        let id = Uuid::new_v4();
        let mut products = HashMap::new();
        products.insert(id, product(id, "Kaju Katli", true));

        let items = vec![cart_item(id, 3, dec!(400), dec!(0))];
        let (_, subtotal) = build_order_lines(&items, &products).unwrap();

        let delivery_fee = dec!(50);
        let discount_amount = dec!(100);
        let total_amount = (subtotal - discount_amount + delivery_fee).max(Decimal::ZERO);

        assert_eq!(subtotal, dec!(1200));
        assert_eq!(total_amount, dec!(1150));
        assert_eq!(
            total_amount,
            (subtotal - discount_amount + delivery_fee).max(Decimal::ZERO)
        );
    }
}
