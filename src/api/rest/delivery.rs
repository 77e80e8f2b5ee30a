use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::engine::delivery::{self, PublishDetails};
use crate::error::AppError;
use crate::models::delivery::{
    ActiveDelivery, DeliveryRequest, DeliveryStatus, DeliveryType, Priority,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/delivery/requests", get(list_requests))
        .route("/delivery/publish", post(publish))
        .route("/delivery/accept", post(accept))
        .route("/delivery/:id/status", put(advance))
        .route("/delivery/active", get(list_active))
}

#[derive(Deserialize)]
pub struct PublishRequest {
    pub order_id: Uuid,
    pub pickup: String,
    pub dropoff: String,
    pub weight_kg: f64,
    pub distance_km: f64,
    pub suggested_fee: f64,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub kind: DeliveryType,
}

#[derive(Deserialize)]
pub struct AcceptRequest {
    pub request_id: Uuid,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub status: DeliveryStatus,
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
) -> Result<Json<Vec<DeliveryRequest>>, AppError> {
    let pool = delivery::pending_requests(&state).await?;
    Ok(Json(pool))
}

async fn publish(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let request = delivery::publish_request(
        &state,
        payload.order_id,
        PublishDetails {
            pickup: payload.pickup,
            dropoff: payload.dropoff,
            weight_kg: payload.weight_kg,
            distance_km: payload.distance_km,
            suggested_fee: payload.suggested_fee,
            priority: payload.priority,
            kind: payload.kind,
        },
    )
    .await?;

    Ok(Json(request))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<ActiveDelivery>, AppError> {
    let delivery = delivery::accept_request(&state, payload.request_id, &identity.id).await?;
    Ok(Json(delivery))
}

async fn advance(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<Json<ActiveDelivery>, AppError> {
    let delivery = delivery::advance_delivery(&state, &identity.id, id, payload.status).await?;
    Ok(Json(delivery))
}

async fn list_active(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<ActiveDelivery>>, AppError> {
    let active = delivery::active_deliveries(&state, &identity.id).await?;
    Ok(Json(active))
}
