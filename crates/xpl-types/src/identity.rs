use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of an entity or user identifier.
pub const MAX_ID_LEN: usize = 100;

/// Stable identifier of a versioned entity.
///
/// An `EntityId` never changes after the entity is created. An exploration
/// and its rights record share the same id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse an entity id, rejecting empty, overlong, or whitespace-bearing input.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        let reason = if id.is_empty() {
            Some("must not be empty".to_string())
        } else if id.chars().count() > MAX_ID_LEN {
            Some(format!("must be at most {MAX_ID_LEN} characters"))
        } else if id.chars().any(char::is_whitespace) {
            Some("must not contain whitespace".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TypeError::InvalidEntityId { id, reason }),
            None => Ok(Self(id)),
        }
    }

    /// Generate a fresh, time-ordered id (UUID v7, simple form).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl std::str::FromStr for EntityId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a user.
///
/// Used for committers on every snapshot and for the owner, editor and
/// viewer lists of exploration rights.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidUserId {
                id,
                reason: "must not be empty".into(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidUserId {
                id,
                reason: "must not contain whitespace".into(),
            });
        }
        if id.chars().count() > MAX_ID_LEN {
            return Err(TypeError::InvalidUserId {
                id,
                reason: format!("must be at most {MAX_ID_LEN} characters"),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::str::FromStr for UserId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
