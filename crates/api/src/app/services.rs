//! Service wiring: stores, token service and revocation set shared by handlers.

use std::sync::Arc;

use chrono::Duration;

use penstack_auth::{Hs256TokenService, InMemoryRevocationStore, RevocationStore, TokenError};
use penstack_infra::{InMemoryPenStore, InMemoryUserStore, PenStore, UserStore};

use crate::config::AppConfig;

/// Everything a handler needs, owned once per process and shared via `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub pens: Arc<dyn PenStore>,
    pub tokens: Arc<Hs256TokenService>,
    pub revocations: Arc<dyn RevocationStore>,
    pub token_ttl: Duration,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        pens: Arc<dyn PenStore>,
        tokens: Arc<Hs256TokenService>,
        revocations: Arc<dyn RevocationStore>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            pens,
            tokens,
            revocations,
            token_ttl,
        }
    }
}

/// In-memory wiring (dev/test): document stores and revocation set live in
/// this process and are lost on restart.
pub fn build_in_memory_services(config: &AppConfig) -> Result<AppServices, TokenError> {
    let tokens = Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes())?);

    Ok(AppServices::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryPenStore::new()),
        tokens,
        Arc::new(InMemoryRevocationStore::new()),
        config.token_ttl,
    ))
}
