use axum::Router;

pub mod pens;
pub mod system;
pub mod users;

/// Routes that need no identity.
pub fn public_router() -> Router {
    Router::new()
        .nest("/api/users", users::public_router())
        .nest("/api/pens", pens::public_router())
}

/// Routes behind the auth gate; handlers may extract `AuthContext`.
pub fn protected_router() -> Router {
    Router::new()
        .nest("/api/users", users::protected_router())
        .nest("/api/pens", pens::protected_router())
}
