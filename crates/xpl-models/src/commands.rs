//! Commit commands.
//!
//! A commit command is a structured description of one semantic change. A
//! list of them is stored with every snapshot for audit and history display.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xpl_types::UserId;

use crate::property::ExplorationProperty;
use crate::rights::{RightsStatus, Role};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ExplorationCommand {
    CreateNew {
        title: String,
        category: String,
    },
    EditExplorationProperty {
        property_name: ExplorationProperty,
        new_value: Value,
        old_value: Value,
    },
    AddState {
        state_name: String,
    },
    RenameState {
        old_state_name: String,
        new_state_name: String,
    },
    DeleteState {
        state_name: String,
    },
    EditStateProperty {
        state_name: String,
        property_name: String,
        new_value: Value,
        old_value: Value,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RightsCommand {
    CreateNew,
    ChangeRole {
        assignee_id: UserId,
        old_role: Role,
        new_role: Role,
    },
    ChangeExplorationStatus {
        old_status: RightsStatus,
        new_status: RightsStatus,
    },
    ReleaseOwnership,
}
