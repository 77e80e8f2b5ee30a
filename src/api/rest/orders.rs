use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::auth::AuthUser;
use crate::engine::orders;
use crate::error::AppError;
use crate::models::identity::Role;
use crate::models::order::{Order, OrderItem, OrderStatus};
use crate::state::AppState;
use crate::store::keys;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", put(update_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = orders::create_order(&state, &identity.id, payload.items).await?;
    Ok(Json(order))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let key = match query.role.unwrap_or(identity.active_role) {
        Role::Consumer => keys::consumer_orders(&identity.id),
        Role::Farmer => keys::farmer_orders(&identity.id),
        Role::Driver => {
            return Err(AppError::Validation(
                "role must be consumer or farmer".to_string(),
            ));
        }
    };

    let list: Vec<Order> = state.store.get(&key)?.unwrap_or_default();
    Ok(Json(list))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order: Order = state
        .store
        .get(&keys::order(id))?
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = orders::transition_order(&state, id, payload.status).await?;
    Ok(Json(order))
}
