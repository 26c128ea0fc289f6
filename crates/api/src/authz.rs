//! API-side ownership guard for pens.
//!
//! Handlers call these **before** touching the store so a caller who does not
//! own a pen gets `403` and nothing is written.

use penstack_auth::{require_owner, require_readable};
use penstack_core::Pen;

use crate::app::errors::ApiError;
use crate::context::AuthContext;

/// Only the pen's creator may update or delete it.
pub fn authorize_pen_mutation(caller: &AuthContext, pen: &Pen) -> Result<(), ApiError> {
    require_owner(caller.user_id(), pen.owner_id()).map_err(|e| {
        tracing::info!(
            pen_id = %pen.id,
            caller = %caller.user_id(),
            "pen mutation forbidden"
        );
        ApiError::from(e)
    })
}

/// Public pens are readable by any authenticated caller; private ones only by the owner.
pub fn authorize_pen_read(caller: &AuthContext, pen: &Pen) -> Result<(), ApiError> {
    require_readable(caller.user_id(), pen.owner_id(), pen.is_public).map_err(ApiError::from)
}
