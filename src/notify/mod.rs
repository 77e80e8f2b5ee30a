//! Fire-and-forget status-change fan-out. At-most-once, lossy by design;
//! a dropped event never fails or rolls back the transition that raised it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::order::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub message: String,
    pub at: DateTime<Utc>,
}

pub struct NotificationRelay {
    tx: broadcast::Sender<Notification>,
}

impl NotificationRelay {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn notify(&self, user_id: &str, order_id: Uuid, status: OrderStatus) {
        let notification = Notification {
            user_id: user_id.to_string(),
            order_id,
            status,
            message: status.timeline_message().to_string(),
            at: Utc::now(),
        };

        // send only errors when nobody is subscribed
        let _ = self.tx.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
