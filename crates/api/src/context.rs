use chrono::{DateTime, Utc};

use penstack_auth::{Identity, IdentityClaims};
use penstack_core::UserId;

/// Authenticated caller for a request, attached by the auth gate.
///
/// This is immutable and owned by the request; it is never shared between
/// concurrent requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    claims: IdentityClaims,
    token: String,
}

impl AuthContext {
    pub fn new(claims: IdentityClaims, token: impl Into<String>) -> Self {
        Self {
            claims,
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }

    pub fn identity(&self) -> Identity {
        self.claims.identity()
    }

    /// The raw bearer token the request was authenticated with (used by logout).
    pub fn token(&self) -> &str {
        &self.token
    }
}
