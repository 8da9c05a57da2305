use crate::orders::OrderStatus;

/// Service for managing order status transitions
///
/// The fulfilment chain moves forward only:
/// pending → confirmed → processing → out_for_delivery → delivered.
/// Skip-ahead moves along the chain are allowed (the admin dashboard drives
/// them). `pending` and `confirmed` orders may be cancelled. `delivered` and
/// `cancelled` are terminal and never mutated again.
pub struct StatusMachine;

impl StatusMachine {
    /// Position in the forward fulfilment chain; terminal cancellation has
    /// no rank
    fn rank(status: OrderStatus) -> Option<u8> {
        match status {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::OutForDelivery => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Whether a customer (or admin) may still cancel an order in this state
    pub fn can_cancel(status: OrderStatus) -> bool {
        matches!(status, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Check if a status transition is valid
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        // Terminal states are never mutated
        if matches!(from, OrderStatus::Delivered | OrderStatus::Cancelled) {
            return false;
        }

        if to == OrderStatus::Cancelled {
            return Self::can_cancel(from);
        }

        match (Self::rank(from), Self::rank(to)) {
            (Some(from_rank), Some(to_rank)) => to_rank > from_rank,
            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}
