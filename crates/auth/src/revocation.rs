//! Logout revocation set.
//!
//! Tokens are stateless, so a token that was handed back on logout stays
//! cryptographically valid until it expires. The revocation set remembers
//! those raw token strings for the life of the process.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Store of explicitly invalidated tokens.
///
/// Both operations are synchronous and must not be held across an `.await`.
/// A `revoke` that has returned is visible to every later `is_revoked`.
pub trait RevocationStore: Send + Sync {
    /// Mark `token` as invalid. Revoking an already revoked token is a no-op.
    fn revoke(&self, token: &str);

    fn is_revoked(&self, token: &str) -> bool;

    /// Number of distinct revoked tokens.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> RevocationStore for Arc<S>
where
    S: RevocationStore + ?Sized,
{
    fn revoke(&self, token: &str) {
        (**self).revoke(token)
    }

    fn is_revoked(&self, token: &str) -> bool {
        (**self).is_revoked(token)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Process-local revocation set. Entries are never pruned and are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    inner: RwLock<HashSet<String>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// A panic while holding the lock cannot leave a `HashSet` half-inserted, so a
// poisoned lock is safe to keep using.
impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str) {
        let mut set = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if set.insert(token.to_string()) {
            tracing::debug!(revoked = set.len(), "token revoked");
        }
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(token)
    }

    fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
