use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use penstack_core::UserId;

use crate::TokenError;

/// Who a token is issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

/// Claims carried inside a session token.
///
/// Serialized as `{ id, username, iat, exp, jti }`; `iat`/`exp` are Unix
/// seconds so the same value survives an encode/decode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the user the token was issued to.
    #[serde(rename = "id")]
    pub sub: UserId,

    /// Display name at issuance time.
    pub username: String,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// Unique per issuance, so two logins in the same second get distinct tokens.
    pub jti: Uuid,
}

impl IdentityClaims {
    /// Claims for `identity`, valid from `issued_at` for `ttl`.
    ///
    /// Both timestamps are truncated to whole seconds.
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let issued_at = issued_at.trunc_subsecs(0);
        Self {
            sub: identity.id,
            username: identity.username.clone(),
            issued_at,
            expires_at: issued_at + Duration::seconds(ttl.num_seconds()),
            jti: Uuid::now_v7(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub,
            username: self.username.clone(),
        }
    }
}

/// Check the time window of already-authenticated claims.
///
/// Signature verification happens before this; see [`crate::TokenVerifier`].
pub fn validate_claims(claims: &IdentityClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::Malformed);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new(),
            username: "ada".into(),
        }
    }

    #[test]
    fn expiry_is_issued_at_plus_ttl() {
        let now = Utc::now();
        let claims = IdentityClaims::new(&identity(), now, Duration::minutes(10));
        assert_eq!(claims.issued_at, now.trunc_subsecs(0));
        assert_eq!(claims.expires_at - claims.issued_at, Duration::minutes(10));
    }

    #[test]
    fn valid_strictly_before_expiry() {
        let now = Utc::now();
        let claims = IdentityClaims::new(&identity(), now, Duration::seconds(60));

        assert_eq!(validate_claims(&claims, claims.issued_at), Ok(()));
        assert_eq!(
            validate_claims(&claims, claims.expires_at - Duration::seconds(1)),
            Ok(())
        );
        assert_eq!(validate_claims(&claims, claims.expires_at), Err(TokenError::Expired));
    }

    #[test]
    fn non_positive_ttl_is_malformed() {
        let claims = IdentityClaims::new(&identity(), Utc::now(), Duration::zero());
        assert_eq!(
            validate_claims(&claims, claims.issued_at),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn serializes_downstream_claim_shape() {
        let claims = IdentityClaims::new(&identity(), Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["id"], claims.sub.to_string());
        assert_eq!(json["username"], "ada");
        assert_eq!(json["exp"], claims.expires_at.timestamp());
        assert_eq!(json["iat"], claims.issued_at.timestamp());
    }
}
