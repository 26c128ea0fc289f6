use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use penstack_core::{NewPen, NewUser, Pen, PenId, PenPatch, User, UserId};

use super::{BatchDelete, PenStore, StoreError, UserStore};

fn poisoned() -> StoreError {
    tracing::error!("in-memory store lock poisoned");
    StoreError::Unavailable("lock poisoned".to_string())
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| poisoned())
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| poisoned())
}

fn newest_first(mut pens: Vec<Pen>) -> Vec<Pen> {
    pens.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    pens
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let mut users = write(&self.users)?;

        let taken = users
            .values()
            .any(|u| u.username == user.username() || u.email == user.email());
        if taken {
            return Err(StoreError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let user = user.into_user(now);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory pen store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPenStore {
    pens: RwLock<HashMap<PenId, Pen>>,
}

impl InMemoryPenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PenStore for InMemoryPenStore {
    async fn insert(&self, pen: NewPen, owner: UserId, now: DateTime<Utc>) -> Result<Pen, StoreError> {
        let pen = Pen::create(pen, owner, now);
        write(&self.pens)?.insert(pen.id, pen.clone());
        Ok(pen)
    }

    async fn find_by_id(&self, id: PenId) -> Result<Option<Pen>, StoreError> {
        Ok(read(&self.pens)?.get(&id).cloned())
    }

    async fn update(
        &self,
        id: PenId,
        patch: PenPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Pen>, StoreError> {
        let mut pens = write(&self.pens)?;
        let Some(pen) = pens.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(pen, now)?;
        Ok(Some(pen.clone()))
    }

    async fn delete(&self, id: PenId) -> Result<Option<Pen>, StoreError> {
        Ok(write(&self.pens)?.remove(&id))
    }

    async fn delete_all_or_none(
        &self,
        ids: &[PenId],
        allowed: &(dyn for<'p> Fn(&'p Pen) -> bool + Send + Sync),
    ) -> Result<BatchDelete, StoreError> {
        let mut pens = write(&self.pens)?;

        if let Some(missing) = ids.iter().find(|id| !pens.contains_key(*id)) {
            return Ok(BatchDelete::Missing(*missing));
        }
        if let Some(refused) = ids.iter().filter_map(|id| pens.get(id)).find(|p| !allowed(p)) {
            return Ok(BatchDelete::Refused(refused.clone()));
        }

        let removed: Vec<Pen> = ids.iter().filter_map(|id| pens.remove(id)).collect();
        tracing::debug!(removed = removed.len(), "pens removed");
        Ok(BatchDelete::Deleted(removed))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pen>, StoreError> {
        let pens = read(&self.pens)?
            .values()
            .filter(|p| p.owner_id() == owner)
            .cloned()
            .collect();
        Ok(newest_first(pens))
    }

    async fn list_public(&self) -> Result<Vec<Pen>, StoreError> {
        let pens = read(&self.pens)?
            .values()
            .filter(|p| p.is_public)
            .cloned()
            .collect();
        Ok(newest_first(pens))
    }
}
