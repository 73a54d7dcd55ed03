use thiserror::Error;
use xpl_store::StoreError;

/// Errors produced by model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A caller-supplied argument violates the model contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The model would violate one of its invariants.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;
