//! Bearer-token resolution. The identity provider is an external
//! collaborator; here it is an in-memory token table injected into the
//! state, which is all the service needs to enforce the boundary.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::identity::UserIdentity;
use crate::state::AppState;

pub struct IdentityProvider {
    tokens: DashMap<String, UserIdentity>,
}

impl IdentityProvider {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    pub fn register(&self, token: &str, identity: UserIdentity) {
        self.tokens.insert(token.to_string(), identity);
    }

    pub fn resolve(&self, token: &str) -> Option<UserIdentity> {
        self.tokens.get(token).map(|entry| entry.value().clone())
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Extractor for the authenticated caller. Missing or unknown tokens are
/// rejected at the boundary, never silently ignored.
pub struct AuthUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let identity = state
            .identities
            .resolve(token)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(identity))
    }
}
