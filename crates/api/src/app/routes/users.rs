use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use penstack_auth::{Identity, IdentityClaims, TokenIssuer, hash_password, verify_password};
use penstack_core::user::{normalize_email, validate_username};
use penstack_core::{NewUser, UserId};

use crate::app::dto::{self, ApiJson, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AuthContext;

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub fn public_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/:id", get(get_user))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = validate_username(&dto::required(body.username, "username")?)?;
    let email = normalize_email(&dto::required(body.email, "email")?)?;
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    let new_user = NewUser::new(&username, &email, password_hash)?;

    let user = services.users.insert(new_user, Utc::now()).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(dto::user_to_json(&user))))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = dto::required(body.email, "email")?;
    let password = body.password.unwrap_or_default();

    let email = normalize_email(&email).map_err(|_| ApiError::bad_request(INVALID_CREDENTIALS))?;
    let Some(user) = services.users.find_by_email(&email).await? else {
        tracing::info!("login failed: unknown email");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    let stored_hash = user.password_hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?;
    if !matches {
        tracing::info!(user_id = %user.id, "login failed: wrong password");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let identity = Identity {
        id: user.id,
        username: user.username.clone(),
    };
    let claims = IdentityClaims::new(&identity, Utc::now(), services.token_ttl);
    let token = services.tokens.issue(&claims)?;

    tracing::info!(user_id = %user.id, expires_at = %claims.expires_at, "user logged in");

    Ok(Json(json!({
        "token": token,
        "user": dto::user_to_json(&user),
    })))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<AuthContext>,
) -> impl IntoResponse {
    services.revocations.revoke(caller.token());

    tracing::info!(user_id = %caller.user_id(), "user logged out");

    Json(json!({
        "message": "logged out",
        "user": {
            "id": caller.user_id().to_string(),
            "username": caller.username(),
        },
    }))
}

pub async fn me(Extension(caller): Extension<AuthContext>) -> impl IntoResponse {
    Json(json!({
        "id": caller.user_id().to_string(),
        "username": caller.username(),
        "expiresAt": caller.expires_at(),
    }))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = id
        .parse()
        .map_err(|_| ApiError::bad_request("invalid user id"))?;

    let user = services
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(dto::user_profile_to_json(&user)))
}
