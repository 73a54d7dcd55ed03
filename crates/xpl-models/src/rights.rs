use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xpl_store::VersionedModel;
use xpl_types::UserId;

use crate::commands::RightsCommand;
use crate::error::ModelError;

/// Publication status of an exploration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RightsStatus {
    #[default]
    Private,
    Public,
    Publicized,
}

impl RightsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Publicized => "publicized",
        }
    }
}

impl FromStr for RightsStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            "publicized" => Ok(Self::Publicized),
            other => Err(ModelError::InvalidArgument(format!(
                "invalid exploration status: {other}"
            ))),
        }
    }
}

impl fmt::Display for RightsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's role on one exploration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
    #[serde(rename = "none")]
    Unassigned,
}

/// Versioned model of who may access an exploration.
///
/// Stored under the id of the exploration it governs. The id lists are kept
/// in insertion order and duplicates are not removed here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationRights {
    #[serde(default)]
    pub owner_ids: Vec<UserId>,
    #[serde(default)]
    pub editor_ids: Vec<UserId>,
    #[serde(default)]
    pub viewer_ids: Vec<UserId>,
    /// Whether this exploration is owned by the community.
    #[serde(default)]
    pub community_owned: bool,
    #[serde(default)]
    pub status: RightsStatus,
}

impl ExplorationRights {
    /// Private rights with a single owner.
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner_ids: vec![owner],
            ..Self::default()
        }
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        self.owner_ids.contains(user)
    }

    pub fn can_edit(&self, user: &UserId) -> bool {
        self.community_owned || self.is_owner(user) || self.editor_ids.contains(user)
    }

    pub fn can_view(&self, user: &UserId) -> bool {
        self.status != RightsStatus::Private || self.can_edit(user) || self.viewer_ids.contains(user)
    }

    /// The strongest role `user` holds.
    pub fn role_of(&self, user: &UserId) -> Role {
        if self.is_owner(user) {
            Role::Owner
        } else if self.editor_ids.contains(user) {
            Role::Editor
        } else if self.viewer_ids.contains(user) {
            Role::Viewer
        } else {
            Role::Unassigned
        }
    }
}

impl VersionedModel for ExplorationRights {
    const KIND: &'static str = "exploration_rights";
    const ALLOW_REVERT: bool = false;
    type Command = RightsCommand;
}
