//! Registered user accounts.

use chrono::{DateTime, Utc};

use crate::{DomainError, DomainResult, UserId};

/// A stored user account.
///
/// The password is only ever held as an Argon2 PHC string; this type is not
/// `Serialize` so it cannot be written to a response by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Validated registration data, ready to be persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    email: String,
    password_hash: String,
}

impl NewUser {
    pub fn new(username: &str, email: &str, password_hash: String) -> DomainResult<Self> {
        Ok(Self {
            username: validate_username(username)?,
            email: normalize_email(email)?,
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Materialize the account with a fresh id.
    pub fn into_user(self, created_at: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at,
        }
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Trim a username and reject blank ones.
pub fn validate_username(username: &str) -> DomainResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    Ok(username.to_string())
}

/// Trim and lowercase an email address after a basic shape check.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(DomainError::validation("invalid email format")),
    }
}
