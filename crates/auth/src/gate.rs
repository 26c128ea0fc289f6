//! Auth Gate decision: bearer string in, verified claims or a rejection out.
//!
//! The HTTP layer is responsible for pulling the bearer string out of the
//! request; everything after that lives here so it can be tested without a
//! server.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{IdentityClaims, RevocationStore, TokenError, TokenVerifier};

/// Why a request was refused by the gate. Every variant is a `401`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateRejection {
    #[error("missing token")]
    MissingToken,

    #[error("token invalidated")]
    Revoked,

    #[error("invalid token")]
    Invalid(TokenError),
}

/// Resolve the caller's identity.
///
/// Checks run in a fixed order: presence, revocation, then signature and
/// expiry. The gate reads the revocation store but never writes to it.
pub fn authenticate(
    bearer: Option<&str>,
    verifier: &dyn TokenVerifier,
    revocations: &dyn RevocationStore,
    now: DateTime<Utc>,
) -> Result<IdentityClaims, GateRejection> {
    let token = bearer.ok_or(GateRejection::MissingToken)?;

    if revocations.is_revoked(token) {
        return Err(GateRejection::Revoked);
    }

    verifier.verify(token, now).map_err(GateRejection::Invalid)
}
