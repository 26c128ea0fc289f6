//! `penstack-auth`: session tokens, logout revocation, and ownership checks.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API crate
//! feeds it raw bearer strings and resource owners, and maps its verdicts to
//! status codes.

pub mod claims;
pub mod gate;
pub mod ownership;
pub mod password;
pub mod revocation;
pub mod token;

pub use claims::{Identity, IdentityClaims, validate_claims};
pub use gate::{GateRejection, authenticate};
pub use ownership::{
    AuthzError, OwnershipDecision, authorize_mutation, authorize_read, require_owner, require_readable,
};
pub use password::{PasswordError, hash_password, verify_password};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use token::{Hs256TokenService, TokenError, TokenIssuer, TokenVerifier};
