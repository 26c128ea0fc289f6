use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use penstack_core::{Pen, User, UserId};

use crate::app::errors::ApiError;

// -------------------------
// Extractors
// -------------------------

/// `Json<T>` whose rejection is a JSON `400` instead of axum's plain-text body.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePenRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Option<Vec<String>>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "email": user.email,
    })
}

pub fn user_profile_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "username": user.username,
        "email": user.email,
        "createdAt": user.created_at,
    })
}

/// Author as shown next to a public pen.
#[derive(Debug, Serialize)]
pub struct AuthorView<'a> {
    pub id: UserId,
    pub username: &'a str,
}

/// A pen plus its author's public profile (`user: {id, username}`), or
/// `user: null` if the author no longer exists.
#[derive(Debug, Serialize)]
pub struct PenWithAuthor<'a> {
    #[serde(flatten)]
    pub pen: &'a Pen,
    pub user: Option<AuthorView<'a>>,
}

impl<'a> PenWithAuthor<'a> {
    pub fn new(pen: &'a Pen, author: Option<&'a User>) -> Self {
        Self {
            pen,
            user: author.map(|u| AuthorView {
                id: u.id,
                username: &u.username,
            }),
        }
    }
}

/// Treat a missing or blank field as absent.
pub fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}
