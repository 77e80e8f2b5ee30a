use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of an order. Transitions move strictly forward along
/// [`OrderStatus::next`]; `Cancelled` is reachable only while the order is
/// still in the cancellation window (`Ordered` or `Accepted`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Ordered,
    Accepted,
    Preparing,
    Prepared,
    PickedUp,
    InTransit,
    Nearby,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Ordered => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Prepared),
            OrderStatus::Prepared => Some(OrderStatus::PickedUp),
            OrderStatus::PickedUp => Some(OrderStatus::InTransit),
            OrderStatus::InTransit => Some(OrderStatus::Nearby),
            OrderStatus::Nearby => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Cancellation window closes once preparation starts.
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Ordered | OrderStatus::Accepted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Ordered => "ordered",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Prepared => "prepared",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Nearby => "nearby",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human-readable timeline message for a transition into this status.
    pub fn timeline_message(self) -> &'static str {
        match self {
            OrderStatus::Ordered => "Order placed",
            OrderStatus::Accepted => "Order accepted by farmer",
            OrderStatus::Preparing => "Farmer is preparing the order",
            OrderStatus::Prepared => "Order is ready for pickup",
            OrderStatus::PickedUp => "Driver picked up the order",
            OrderStatus::InTransit => "Order is on the way",
            OrderStatus::Nearby => "Driver is nearby",
            OrderStatus::Delivered => "Order delivered",
            OrderStatus::Cancelled => "Order cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub farmer_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub consumer_id: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    /// Append-only audit trail, oldest entry first. Seeded with one
    /// `ordered` entry at creation and never truncated.
    pub timeline: Vec<TimelineEntry>,
    pub driver_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// Distinct farmer ids across the order's items, in first-seen order.
    pub fn farmer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for item in &self.items {
            if !ids.iter().any(|id| id == &item.farmer_id) {
                ids.push(item.farmer_id.clone());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn forward_chain_ends_at_delivered() {
        let mut status = OrderStatus::Ordered;
        let mut hops = 0;
        while let Some(next) = status.next() {
            status = next;
            hops += 1;
        }
        assert_eq!(status, OrderStatus::Delivered);
        assert_eq!(hops, 7);
    }

    #[test]
    fn terminal_states_have_no_successor() {
        assert!(OrderStatus::Delivered.next().is_none());
        assert!(OrderStatus::Cancelled.next().is_none());
    }

    #[test]
    fn cancellation_window_closes_at_preparing() {
        assert!(OrderStatus::Ordered.is_cancellable());
        assert!(OrderStatus::Accepted.is_cancellable());
        assert!(!OrderStatus::Preparing.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
    }
}
