//! Pending delivery pool and the driver-side delivery sub-machine.
//!
//! All pool mutations run under `AppState::pool_lock` so acceptance is a
//! single check-and-remove: of two concurrent drivers exactly one wins and
//! the other sees `NotFound`.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{orders, wallet};
use crate::error::AppError;
use crate::models::delivery::{
    ActiveDelivery, DeliveryRequest, DeliveryStatus, DeliveryType, Priority,
};
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::keys;

pub struct PublishDetails {
    pub pickup: String,
    pub dropoff: String,
    pub weight_kg: f64,
    pub distance_km: f64,
    pub suggested_fee: f64,
    pub priority: Priority,
    pub kind: DeliveryType,
}

pub async fn publish_request(
    state: &AppState,
    order_id: Uuid,
    details: PublishDetails,
) -> Result<DeliveryRequest, AppError> {
    if details.suggested_fee < 0.0 {
        return Err(AppError::Validation(
            "suggested_fee must be >= 0".to_string(),
        ));
    }

    let order: Order = state
        .store
        .get(&keys::order(order_id))?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if order.status != OrderStatus::Prepared {
        return Err(AppError::Precondition(format!(
            "order {order_id} is {}, only prepared orders can be published",
            order.status.as_str()
        )));
    }

    let _guard = state.pool_lock.lock().await;

    let mut pool: Vec<DeliveryRequest> =
        state.store.get(keys::PENDING_REQUESTS)?.unwrap_or_default();

    if pool.iter().any(|request| request.order_id == order_id) {
        return Err(AppError::Precondition(format!(
            "order {order_id} already has a pending delivery request"
        )));
    }

    let request = DeliveryRequest {
        id: Uuid::new_v4(),
        order_id,
        pickup: details.pickup,
        dropoff: details.dropoff,
        weight_kg: details.weight_kg,
        distance_km: details.distance_km,
        suggested_fee: details.suggested_fee,
        priority: details.priority,
        kind: details.kind,
        created_at: Utc::now(),
    };

    pool.push(request.clone());
    state.store.put(keys::PENDING_REQUESTS, &pool)?;
    state.metrics.pending_requests.set(pool.len() as i64);

    info!(request_id = %request.id, order_id = %order_id, "delivery request published");

    Ok(request)
}

pub async fn pending_requests(state: &AppState) -> Result<Vec<DeliveryRequest>, AppError> {
    Ok(state.store.get(keys::PENDING_REQUESTS)?.unwrap_or_default())
}

pub async fn active_deliveries(
    state: &AppState,
    driver_id: &str,
) -> Result<Vec<ActiveDelivery>, AppError> {
    Ok(state
        .store
        .get(&keys::active_deliveries(driver_id))?
        .unwrap_or_default())
}

/// First acceptor wins. Pool removal and ActiveDelivery creation happen
/// inside one critical section; a request already taken (or cancelled
/// upstream) surfaces as `NotFound`. The owning order is checked and
/// transitioned before any pool or active-set write, so a failed accept
/// leaves both collections untouched.
pub async fn accept_request(
    state: &AppState,
    request_id: Uuid,
    driver_id: &str,
) -> Result<ActiveDelivery, AppError> {
    let _guard = state.pool_lock.lock().await;

    let mut pool: Vec<DeliveryRequest> =
        state.store.get(keys::PENDING_REQUESTS)?.unwrap_or_default();

    let position = pool
        .iter()
        .position(|request| request.id == request_id)
        .ok_or_else(|| {
            state
                .metrics
                .deliveries_total
                .with_label_values(&["conflict"])
                .inc();
            AppError::NotFound(format!("delivery request {request_id} was already accepted"))
        })?;

    let order: Order = state
        .store
        .get(&keys::order(pool[position].order_id))?
        .ok_or_else(|| {
            AppError::NotFound(format!("order {} not found", pool[position].order_id))
        })?;

    if order.status != OrderStatus::Prepared {
        return Err(AppError::Precondition(format!(
            "order {} is {}, no longer awaiting pickup",
            order.id,
            order.status.as_str()
        )));
    }

    // Couple the order machine first; if it refuses, nothing was consumed.
    orders::transition_order(state, order.id, OrderStatus::PickedUp).await?;
    orders::set_driver(state, order.id, driver_id).await?;

    let request = pool.remove(position);
    let now = Utc::now();
    let delivery = ActiveDelivery {
        id: Uuid::new_v4(),
        request_id: request.id,
        order_id: request.order_id,
        driver_id: driver_id.to_string(),
        status: DeliveryStatus::PickedUp,
        progress: DeliveryStatus::PickedUp.progress(),
        suggested_fee: request.suggested_fee,
        accepted_at: now,
        updated_at: now,
    };

    let active_key = keys::active_deliveries(driver_id);
    let mut active: Vec<ActiveDelivery> = state.store.get(&active_key)?.unwrap_or_default();
    active.push(delivery.clone());

    state.store.put(&active_key, &active)?;
    state.store.put(keys::PENDING_REQUESTS, &pool)?;
    state.metrics.pending_requests.set(pool.len() as i64);

    state
        .metrics
        .deliveries_total
        .with_label_values(&["accepted"])
        .inc();

    info!(
        delivery_id = %delivery.id,
        request_id = %request_id,
        driver_id,
        "delivery accepted"
    );

    Ok(delivery)
}

pub async fn advance_delivery(
    state: &Arc<AppState>,
    driver_id: &str,
    delivery_id: Uuid,
    requested: DeliveryStatus,
) -> Result<ActiveDelivery, AppError> {
    let active_key = keys::active_deliveries(driver_id);
    let mut active: Vec<ActiveDelivery> = state.store.get(&active_key)?.unwrap_or_default();

    let delivery = active
        .iter_mut()
        .find(|delivery| delivery.id == delivery_id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {delivery_id} not found")))?;

    if delivery.status.next() != Some(requested) {
        state.metrics.transitions_rejected_total.inc();
        return Err(AppError::InvalidTransition {
            from: delivery.status.as_str().to_string(),
            to: requested.as_str().to_string(),
        });
    }

    // Order machine first: if the coupled step fails, the active set
    // keeps its previous state and the caller sees a clean error.
    let order =
        orders::transition_order(state, delivery.order_id, requested.order_status()).await?;

    delivery.set_status(requested);
    let updated = delivery.clone();
    state.store.put(&active_key, &active)?;

    if requested == DeliveryStatus::Delivered {
        settle(state, &order, &updated).await?;
        schedule_removal(state.clone(), driver_id.to_string(), delivery_id);
        state
            .metrics
            .deliveries_total
            .with_label_values(&["delivered"])
            .inc();
    }

    Ok(updated)
}

/// Delivery-completion settlement: the consumer pays the order total, each
/// farmer receives their items' subtotal, the driver receives the fee.
async fn settle(
    state: &AppState,
    order: &Order,
    delivery: &ActiveDelivery,
) -> Result<(), AppError> {
    wallet::apply(
        state,
        &order.consumer_id,
        -order.total,
        &format!("Payment for order {}", order.id),
    )
    .await?;

    for farmer_id in order.farmer_ids() {
        let subtotal: f64 = order
            .items
            .iter()
            .filter(|item| item.farmer_id == farmer_id)
            .map(|item| item.subtotal())
            .sum();
        wallet::apply(
            state,
            &farmer_id,
            subtotal,
            &format!("Sale proceeds for order {}", order.id),
        )
        .await?;
    }

    wallet::apply(
        state,
        &delivery.driver_id,
        delivery.suggested_fee,
        &format!("Delivery fee for order {}", order.id),
    )
    .await?;

    Ok(())
}

/// Delivered entries linger in the driver's active set for a short grace
/// period so the client can show the completed state, then drop out.
fn schedule_removal(state: Arc<AppState>, driver_id: String, delivery_id: Uuid) {
    tokio::spawn(async move {
        sleep(state.delivered_retention).await;

        let active_key = keys::active_deliveries(&driver_id);
        let active: Result<Option<Vec<ActiveDelivery>>, _> = state.store.get(&active_key);
        match active {
            Ok(Some(mut list)) => {
                list.retain(|delivery| delivery.id != delivery_id);
                if let Err(err) = state.store.put(&active_key, &list) {
                    warn!(error = %err, "failed to prune delivered entry");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to read active set for pruning"),
        }
    });
}
