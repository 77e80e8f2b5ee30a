use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::api::auth::AuthUser;
use crate::engine::wallet;
use crate::error::AppError;
use crate::models::wallet::Wallet;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/wallet", get(get_wallet))
}

async fn get_wallet(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Wallet>, AppError> {
    let wallet = wallet::wallet_for(&state, &identity.id).await?;
    Ok(Json(wallet))
}
