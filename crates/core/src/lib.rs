//! `penstack-core`: domain building blocks shared by every other crate.
//!
//! This crate contains **pure domain** types (no storage, no HTTP).

pub mod error;
pub mod id;
pub mod pen;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::{PenId, UserId};
pub use pen::{NewPen, Pen, PenPatch};
pub use user::{NewUser, User};
