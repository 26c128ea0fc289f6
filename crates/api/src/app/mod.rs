//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, token service, revocation set
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router with in-memory stores (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Result<Router, ConfigError> {
    let services = services::build_in_memory_services(config)
        .map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
    build_app_with(Arc::new(services), config)
}

/// Build the router around already constructed services.
pub fn build_app_with(services: Arc<AppServices>, config: &AppConfig) -> Result<Router, ConfigError> {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
        revocations: services.revocations.clone(),
    };

    // Protected routes: the auth gate runs before every handler here.
    let protected = routes::protected_router().route_layer(
        axum::middleware::from_fn_with_state(auth_state, middleware::auth_middleware),
    );

    let app = Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origin)?),
        );

    Ok(app)
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
        name: "CORS_ORIGIN",
        reason: e.to_string(),
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}
