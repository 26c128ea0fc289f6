use serde::Serialize;
use thiserror::Error;

use penstack_core::UserId;

/// Outcome of an ownership check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipDecision {
    Allowed,
    Forbidden,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: you do not own this pen")]
    NotOwner,

    #[error("forbidden: this pen is private")]
    Private,
}

impl OwnershipDecision {
    pub fn is_allowed(self) -> bool {
        self == OwnershipDecision::Allowed
    }
}

/// May `actor` update or delete a resource owned by `owner`?
///
/// - No IO
/// - No panics
/// - Only the creator may mutate
pub fn authorize_mutation(actor: UserId, owner: UserId) -> OwnershipDecision {
    if actor == owner {
        OwnershipDecision::Allowed
    } else {
        OwnershipDecision::Forbidden
    }
}

/// May `actor` read a resource owned by `owner`?
///
/// Public resources are readable by anyone; private ones only by their owner.
pub fn authorize_read(actor: UserId, owner: UserId, is_public: bool) -> OwnershipDecision {
    if is_public {
        OwnershipDecision::Allowed
    } else {
        authorize_mutation(actor, owner)
    }
}

/// Turn a mutation decision into a `Result` for `?` propagation.
pub fn require_owner(actor: UserId, owner: UserId) -> Result<(), AuthzError> {
    match authorize_mutation(actor, owner) {
        OwnershipDecision::Allowed => Ok(()),
        OwnershipDecision::Forbidden => Err(AuthzError::NotOwner),
    }
}

/// Turn a read decision into a `Result` for `?` propagation.
pub fn require_readable(actor: UserId, owner: UserId, is_public: bool) -> Result<(), AuthzError> {
    match authorize_read(actor, owner, is_public) {
        OwnershipDecision::Allowed => Ok(()),
        OwnershipDecision::Forbidden => Err(AuthzError::Private),
    }
}
