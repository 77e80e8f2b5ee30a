//! Order lifecycle: creation, fan-out into per-farmer views, and the
//! forward-only status machine with its append-only timeline.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderItem, OrderStatus, TimelineEntry};
use crate::state::AppState;
use crate::store::keys;

pub async fn create_order(
    state: &AppState,
    consumer_id: &str,
    items: Vec<OrderItem>,
) -> Result<Order, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation("items cannot be empty".to_string()));
    }

    for (index, item) in items.iter().enumerate() {
        if items[..index]
            .iter()
            .any(|earlier| earlier.product_id == item.product_id)
        {
            return Err(AppError::Validation(format!(
                "item {} appears more than once",
                item.product_id
            )));
        }
        if item.quantity == 0 {
            return Err(AppError::Validation(format!(
                "item {} must have quantity > 0",
                item.product_id
            )));
        }
        if item.unit_price < 0.0 {
            return Err(AppError::Validation(format!(
                "item {} must have unit_price >= 0",
                item.product_id
            )));
        }
    }

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4(),
        consumer_id: consumer_id.to_string(),
        total: items.iter().map(OrderItem::subtotal).sum(),
        items,
        status: OrderStatus::Ordered,
        timeline: vec![TimelineEntry {
            status: OrderStatus::Ordered,
            timestamp: now,
            message: OrderStatus::Ordered.timeline_message().to_string(),
        }],
        driver_id: None,
        created_at: now,
    };

    state.store.put(&keys::order(order.id), &order)?;
    write_indexes(state, &order)?;

    for farmer_id in order.farmer_ids() {
        state.relay.notify(&farmer_id, order.id, order.status);
    }

    state
        .metrics
        .orders_total
        .with_label_values(&[order.status.as_str()])
        .inc();

    info!(order_id = %order.id, consumer_id, total = order.total, "order created");

    Ok(order)
}

pub async fn transition_order(
    state: &AppState,
    order_id: Uuid,
    requested: OrderStatus,
) -> Result<Order, AppError> {
    let mut order: Order = state
        .store
        .get(&keys::order(order_id))?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    validate_transition(order.status, requested).inspect_err(|_| {
        state.metrics.transitions_rejected_total.inc();
    })?;

    order.status = requested;
    order.timeline.push(TimelineEntry {
        status: requested,
        timestamp: Utc::now(),
        message: requested.timeline_message().to_string(),
    });

    state.store.put(&keys::order(order.id), &order)?;
    write_indexes(state, &order)?;

    state.relay.notify(&order.consumer_id, order.id, requested);
    state
        .metrics
        .orders_total
        .with_label_values(&[requested.as_str()])
        .inc();

    info!(order_id = %order.id, status = requested.as_str(), "order transitioned");

    Ok(order)
}

/// Records the driver who accepted the delivery leg of this order.
pub async fn set_driver(
    state: &AppState,
    order_id: Uuid,
    driver_id: &str,
) -> Result<Order, AppError> {
    let mut order: Order = state
        .store
        .get(&keys::order(order_id))?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    order.driver_id = Some(driver_id.to_string());
    state.store.put(&keys::order(order.id), &order)?;
    write_indexes(state, &order)?;

    Ok(order)
}

fn validate_transition(current: OrderStatus, requested: OrderStatus) -> Result<(), AppError> {
    let legal = if requested == OrderStatus::Cancelled {
        current.is_cancellable()
    } else {
        current.next() == Some(requested)
    };

    if legal {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: current.as_str().to_string(),
            to: requested.as_str().to_string(),
        })
    }
}

/// A farmer's view of an order: only that farmer's items, subtotal recomputed.
fn farmer_view(order: &Order, farmer_id: &str) -> Order {
    let items: Vec<OrderItem> = order
        .items
        .iter()
        .filter(|item| item.farmer_id == farmer_id)
        .cloned()
        .collect();

    Order {
        total: items.iter().map(OrderItem::subtotal).sum(),
        items,
        ..order.clone()
    }
}

/// Rewrites the consumer index entry and every farmer index entry for this
/// order. The index lists carry denormalized copies, so each order write
/// must refresh them.
fn write_indexes(state: &AppState, order: &Order) -> Result<(), AppError> {
    upsert(state, &keys::consumer_orders(&order.consumer_id), order.clone())?;

    for farmer_id in order.farmer_ids() {
        upsert(
            state,
            &keys::farmer_orders(&farmer_id),
            farmer_view(order, &farmer_id),
        )?;
    }

    Ok(())
}

fn upsert(state: &AppState, key: &str, order: Order) -> Result<(), AppError> {
    let mut list: Vec<Order> = state.store.get(key)?.unwrap_or_default();

    match list.iter_mut().find(|existing| existing.id == order.id) {
        Some(slot) => *slot = order,
        None => list.push(order),
    }

    state.store.put(key, &list)
}

#[cfg(test)]
mod tests {
    use super::validate_transition;
    use crate::models::order::OrderStatus;

    #[test]
    fn single_step_forward_is_legal() {
        assert!(validate_transition(OrderStatus::Ordered, OrderStatus::Accepted).is_ok());
        assert!(validate_transition(OrderStatus::Nearby, OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let err = validate_transition(OrderStatus::Accepted, OrderStatus::Prepared);
        assert!(err.is_err());
    }

    #[test]
    fn backward_moves_are_rejected() {
        assert!(validate_transition(OrderStatus::Prepared, OrderStatus::Preparing).is_err());
    }

    #[test]
    fn terminal_orders_cannot_move() {
        assert!(validate_transition(OrderStatus::Delivered, OrderStatus::Cancelled).is_err());
        assert!(validate_transition(OrderStatus::Cancelled, OrderStatus::Ordered).is_err());
    }

    #[test]
    fn cancel_allowed_only_before_preparation() {
        assert!(validate_transition(OrderStatus::Ordered, OrderStatus::Cancelled).is_ok());
        assert!(validate_transition(OrderStatus::Accepted, OrderStatus::Cancelled).is_ok());
        assert!(validate_transition(OrderStatus::Preparing, OrderStatus::Cancelled).is_err());
    }
}
