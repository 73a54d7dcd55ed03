use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use xpl_types::{EntityId, UserId};

use crate::error::StoreResult;
use crate::traits::VersionedStore;

/// An entity persisted with full snapshot history.
///
/// Implementors declare a stable kind name, whether history may be reverted,
/// and the typed commit command that describes each change.
pub trait VersionedModel:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind name recorded on every snapshot (e.g. "exploration").
    const KIND: &'static str;

    /// Whether [`VersionedStore::revert`] is permitted for this kind.
    const ALLOW_REVERT: bool;

    /// Structured descriptor of a semantic change, kept for audit display.
    type Command: Clone
        + fmt::Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Check model-level invariants. Called by the store before any
    /// snapshot is written.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Who committed a change, why, and which commands describe it.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitInfo<C> {
    pub committer_id: UserId,
    pub commit_message: String,
    pub commit_cmds: Vec<C>,
}

impl<C> CommitInfo<C> {
    pub fn new(committer_id: UserId, commit_message: impl Into<String>) -> Self {
        Self {
            committer_id,
            commit_message: commit_message.into(),
            commit_cmds: Vec::new(),
        }
    }

    pub fn with_cmd(mut self, cmd: C) -> Self {
        self.commit_cmds.push(cmd);
        self
    }

    pub fn with_cmds(mut self, cmds: impl IntoIterator<Item = C>) -> Self {
        self.commit_cmds.extend(cmds);
        self
    }
}

/// A loaded model instance together with its versioning state.
#[derive(Clone, Debug, PartialEq)]
pub struct Versioned<M> {
    pub id: EntityId,
    pub version: u64,
    pub deleted: bool,
    pub model: M,
}

impl<M: VersionedModel> Versioned<M> {
    /// Commit the current in-memory model as the next version.
    ///
    /// On success `self.version` is advanced to the stored version. On
    /// failure the instance is left untouched.
    pub fn save<S>(&mut self, store: &S, info: &CommitInfo<M::Command>) -> StoreResult<u64>
    where
        S: VersionedStore<M> + ?Sized,
    {
        let version = store.commit(&self.id, self.version, &self.model, info)?;
        self.version = version;
        Ok(version)
    }
}
