use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Sub-machine of the order lifecycle covering the driver-owned leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    PickedUp,
    InTransit,
    Nearby,
    Delivered,
}

impl DeliveryStatus {
    pub fn next(self) -> Option<DeliveryStatus> {
        match self {
            DeliveryStatus::PickedUp => Some(DeliveryStatus::InTransit),
            DeliveryStatus::InTransit => Some(DeliveryStatus::Nearby),
            DeliveryStatus::Nearby => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => None,
        }
    }

    /// Display progress, a pure function of status.
    pub fn progress(self) -> u8 {
        match self {
            DeliveryStatus::PickedUp => 25,
            DeliveryStatus::InTransit => 60,
            DeliveryStatus::Nearby => 90,
            DeliveryStatus::Delivered => 100,
        }
    }

    /// The owning order's status this delivery status keeps in sync with.
    pub fn order_status(self) -> OrderStatus {
        match self {
            DeliveryStatus::PickedUp => OrderStatus::PickedUp,
            DeliveryStatus::InTransit => OrderStatus::InTransit,
            DeliveryStatus::Nearby => OrderStatus::Nearby,
            DeliveryStatus::Delivered => OrderStatus::Delivered,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::PickedUp => "picked_up",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Nearby => "nearby",
            DeliveryStatus::Delivered => "delivered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Standard,
    Express,
    Scheduled,
}

/// An unassigned pickup-to-dropoff leg derived from a prepared order.
/// Lives in the pending pool until a driver accepts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub id: Uuid,
    pub order_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub weight_kg: f64,
    pub distance_km: f64,
    pub suggested_fee: f64,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub kind: DeliveryType,
    pub created_at: DateTime<Utc>,
}

/// A request after acceptance, owned by a driver and tracked through
/// the [`DeliveryStatus`] sub-machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveDelivery {
    pub id: Uuid,
    pub request_id: Uuid,
    pub order_id: Uuid,
    pub driver_id: String,
    pub status: DeliveryStatus,
    /// Always recomputed from `status`, never set independently.
    pub progress: u8,
    pub suggested_fee: f64,
    pub accepted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActiveDelivery {
    pub fn set_status(&mut self, status: DeliveryStatus) {
        self.status = status;
        self.progress = status.progress();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryStatus;
    use crate::models::order::OrderStatus;

    #[test]
    fn progress_mapping_matches_status() {
        assert_eq!(DeliveryStatus::PickedUp.progress(), 25);
        assert_eq!(DeliveryStatus::InTransit.progress(), 60);
        assert_eq!(DeliveryStatus::Nearby.progress(), 90);
        assert_eq!(DeliveryStatus::Delivered.progress(), 100);
    }

    #[test]
    fn sub_machine_mirrors_order_statuses() {
        assert_eq!(
            DeliveryStatus::PickedUp.order_status(),
            OrderStatus::PickedUp
        );
        assert_eq!(
            DeliveryStatus::Delivered.order_status(),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn delivered_is_terminal() {
        assert!(DeliveryStatus::Delivered.next().is_none());
    }
}
