//! Infrastructure layer: document storage for users and pens.

pub mod store;

pub use store::{BatchDelete, InMemoryPenStore, InMemoryUserStore, PenStore, StoreError, UserStore};
