//! Document store abstractions.
//!
//! Handlers only see these traits; the in-memory implementations back dev and
//! tests, and a networked database can slot in without touching the API crate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use penstack_core::{NewPen, NewUser, Pen, PenId, PenPatch, User, UserId};

pub mod in_memory;

pub use in_memory::{InMemoryPenStore, InMemoryUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. username or email taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The patch or record failed domain validation.
    #[error("{0}")]
    Validation(#[from] penstack_core::DomainError),

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of [`PenStore::delete_all_or_none`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDelete {
    /// Every pen was removed.
    Deleted(Vec<Pen>),
    /// This id does not exist; nothing was removed.
    Missing(PenId),
    /// The predicate refused this pen; nothing was removed.
    Refused(Pen),
}

/// User account storage.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new account.
    ///
    /// Fails with [`StoreError::Conflict`] if the username or email is
    /// already registered; the check and the insert are atomic.
    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look up by normalized (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Pen document storage.
///
/// Listings are ordered newest first (`created_at` descending).
#[async_trait::async_trait]
pub trait PenStore: Send + Sync {
    async fn insert(&self, pen: NewPen, owner: UserId, now: DateTime<Utc>) -> Result<Pen, StoreError>;

    async fn find_by_id(&self, id: PenId) -> Result<Option<Pen>, StoreError>;

    /// Apply `patch` and bump `updated_at`. Returns `None` if the pen does not exist.
    async fn update(
        &self,
        id: PenId,
        patch: PenPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Pen>, StoreError>;

    /// Remove a pen, returning the removed record.
    async fn delete(&self, id: PenId) -> Result<Option<Pen>, StoreError>;

    /// Remove every listed pen or none of them.
    ///
    /// Existence is checked for all ids, then `allowed` for every pen, then
    /// the removal happens; all three steps see the same snapshot, so a
    /// concurrent write cannot make the batch partial.
    async fn delete_all_or_none(
        &self,
        ids: &[PenId],
        allowed: &(dyn for<'p> Fn(&'p Pen) -> bool + Send + Sync),
    ) -> Result<BatchDelete, StoreError>;

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pen>, StoreError>;

    async fn list_public(&self) -> Result<Vec<Pen>, StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        (**self).insert(user, now).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }
}

#[async_trait::async_trait]
impl<S> PenStore for Arc<S>
where
    S: PenStore + ?Sized,
{
    async fn insert(&self, pen: NewPen, owner: UserId, now: DateTime<Utc>) -> Result<Pen, StoreError> {
        (**self).insert(pen, owner, now).await
    }

    async fn find_by_id(&self, id: PenId) -> Result<Option<Pen>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update(
        &self,
        id: PenId,
        patch: PenPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Pen>, StoreError> {
        (**self).update(id, patch, now).await
    }

    async fn delete(&self, id: PenId) -> Result<Option<Pen>, StoreError> {
        (**self).delete(id).await
    }

    async fn delete_all_or_none(
        &self,
        ids: &[PenId],
        allowed: &(dyn for<'p> Fn(&'p Pen) -> bool + Send + Sync),
    ) -> Result<BatchDelete, StoreError> {
        (**self).delete_all_or_none(ids, allowed).await
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pen>, StoreError> {
        (**self).list_by_owner(owner).await
    }

    async fn list_public(&self) -> Result<Vec<Pen>, StoreError> {
        (**self).list_public().await
    }
}
