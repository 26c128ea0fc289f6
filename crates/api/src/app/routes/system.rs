use axum::http::{Method, StatusCode, Uri};

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    tracing::debug!(%method, %uri, "no route");
    ApiError::not_found("Not Found")
}
