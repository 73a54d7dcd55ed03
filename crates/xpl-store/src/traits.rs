use xpl_types::{EntityId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::model::{CommitInfo, Versioned, VersionedModel};
use crate::records::{SnapshotContent, SnapshotMetadata};

/// Storage boundary for versioned entities of one kind.
///
/// Implementations must guarantee that every successful write operation
/// appends exactly one snapshot and advances the version by exactly one, and
/// that a failed operation appends nothing.
pub trait VersionedStore<M: VersionedModel>: Send + Sync {
    /// Create a new entity at version 1.
    fn create(
        &self,
        id: &EntityId,
        model: &M,
        info: &CommitInfo<M::Command>,
    ) -> StoreResult<Versioned<M>>;

    /// Commit `model` as version `expected_version + 1`.
    ///
    /// Fails with [`StoreError::VersionConflict`] if the stored version is
    /// not `expected_version`.
    fn commit(
        &self,
        id: &EntityId,
        expected_version: u64,
        model: &M,
        info: &CommitInfo<M::Command>,
    ) -> StoreResult<u64>;

    /// Write a new version whose content equals that of `target_version`.
    fn revert(
        &self,
        id: &EntityId,
        expected_version: u64,
        target_version: u64,
        committer_id: &UserId,
    ) -> StoreResult<Versioned<M>>;

    /// Mark the entity deleted. History is kept.
    fn delete(
        &self,
        id: &EntityId,
        expected_version: u64,
        committer_id: &UserId,
        commit_message: &str,
    ) -> StoreResult<u64>;

    /// Current state of an entity, including deleted ones.
    fn get(&self, id: &EntityId) -> StoreResult<Option<Versioned<M>>>;

    /// Model state as of `version`.
    fn get_version(&self, id: &EntityId, version: u64) -> StoreResult<M>;

    /// Metadata of every snapshot, oldest first. Unknown ids are
    /// [`StoreError::NotFound`].
    fn history(&self, id: &EntityId) -> StoreResult<Vec<SnapshotMetadata<M::Command>>>;

    /// Metadata and content of every snapshot, oldest first. Unknown ids
    /// are [`StoreError::NotFound`].
    fn snapshots(
        &self,
        id: &EntityId,
    ) -> StoreResult<Vec<(SnapshotMetadata<M::Command>, SnapshotContent)>>;

    /// Ids of every entity ever created, including deleted ones, sorted.
    fn all_ids(&self) -> StoreResult<Vec<EntityId>>;

    /// Ids of live entities, sorted.
    fn ids(&self) -> StoreResult<Vec<EntityId>> {
        let mut live = Vec::new();
        for id in self.all_ids()? {
            if let Some(entity) = self.get(&id)? {
                if !entity.deleted {
                    live.push(id);
                }
            }
        }
        Ok(live)
    }

    /// Number of live entities.
    fn count(&self) -> StoreResult<u64> {
        Ok(self.ids()?.len() as u64)
    }

    /// A live entity, or an error if it is missing or deleted.
    fn get_live(&self, id: &EntityId) -> StoreResult<Versioned<M>> {
        match self.get(id)? {
            None => Err(StoreError::NotFound {
                kind: M::KIND,
                id: id.clone(),
            }),
            Some(entity) if entity.deleted => Err(StoreError::Deleted {
                kind: M::KIND,
                id: id.clone(),
            }),
            Some(entity) => Ok(entity),
        }
    }

    /// Every live entity, sorted by id.
    fn list(&self) -> StoreResult<Vec<Versioned<M>>> {
        self.ids()?.iter().map(|id| self.get_live(id)).collect()
    }
}
