use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use penstack_auth::{GateRejection, RevocationStore, TokenVerifier};

use crate::app::errors::ApiError;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
    pub revocations: Arc<dyn RevocationStore>,
}

/// Auth gate: resolve the bearer token into an [`AuthContext`] or answer `401`.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers()).map(str::to_owned);

    let claims = penstack_auth::authenticate(
        token.as_deref(),
        state.tokens.as_ref(),
        state.revocations.as_ref(),
        Utc::now(),
    )
    .map_err(|rejection| {
        match &rejection {
            GateRejection::Invalid(kind) => {
                tracing::warn!(reason = %kind, path = %req.uri().path(), "rejected token")
            }
            other => tracing::debug!(reason = %other, path = %req.uri().path(), "rejected request"),
        }
        ApiError::from(rejection)
    })?;

    // `authenticate` only succeeds when a token was present.
    let token = token.unwrap_or_default();
    req.extensions_mut().insert(AuthContext::new(claims, token));

    Ok(next.run(req).await)
}

/// The raw token from `Authorization: Bearer <token>`, if there is one.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}
