use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity id {id:?}: {reason}")]
    InvalidEntityId { id: String, reason: String },

    #[error("invalid user id {id:?}: {reason}")]
    InvalidUserId { id: String, reason: String },
}
