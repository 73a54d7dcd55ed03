use xpl_types::EntityId;

/// Errors produced by versioned store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} entity not found: {id}")]
    NotFound { kind: &'static str, id: EntityId },

    #[error("{kind} entity already exists: {id}")]
    AlreadyExists { kind: &'static str, id: EntityId },

    #[error("{kind} entity {id} has been deleted")]
    Deleted { kind: &'static str, id: EntityId },

    #[error("version conflict on {id}: expected version {expected}, stored version is {actual}")]
    VersionConflict {
        id: EntityId,
        expected: u64,
        actual: u64,
    },

    #[error("version {version} of {id} does not exist")]
    VersionNotFound { id: EntityId, version: u64 },

    #[error("revert is not allowed for {kind} entities")]
    RevertNotAllowed { kind: &'static str },

    #[error("cannot revert {id} at version {current} to version {target}")]
    InvalidRevertTarget {
        id: EntityId,
        current: u64,
        target: u64,
    },

    #[error("invalid {kind} model: {reason}")]
    InvalidModel { kind: &'static str, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("integrity violation in {id} at version {version}: {reason}")]
    Integrity {
        id: EntityId,
        version: u64,
        reason: String,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
