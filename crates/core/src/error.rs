//! Domain error shared by the whole workspace.
//!
//! `Display` of every variant is the user-facing message, so the HTTP layer
//! can pass it through without rewording.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No record with this id, e.g. `Bid with id 42 not found`.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input rejected before any write, e.g. `All fields are required.`
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// A stored record this build cannot read. Never shown to callers.
    #[error("Internal error: {0}")]
    Internal(String),
}
