use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, info};
use xpl_types::{EntityId, TemporalAnchor, UserId};

use crate::error::{StoreError, StoreResult};
use crate::model::{CommitInfo, Versioned, VersionedModel};
use crate::records::{CommitType, SnapshotContent, SnapshotMetadata};
use crate::traits::VersionedStore;

/// In-memory versioned store for tests, local tools, and embedding.
pub struct InMemoryVersionedStore<M: VersionedModel> {
    inner: RwLock<StoreState<M>>,
}

struct StoreState<M: VersionedModel> {
    entities: HashMap<EntityId, EntityRecord<M>>,
}

struct EntityRecord<M: VersionedModel> {
    current: M,
    version: u64,
    deleted: bool,
    snapshots: Vec<(SnapshotMetadata<M::Command>, SnapshotContent)>,
}

impl<M: VersionedModel> EntityRecord<M> {
    fn to_versioned(&self, id: &EntityId) -> Versioned<M> {
        Versioned {
            id: id.clone(),
            version: self.version,
            deleted: self.deleted,
            model: self.current.clone(),
        }
    }

    fn check_writable(&self, id: &EntityId, expected_version: u64) -> StoreResult<()> {
        if self.deleted {
            return Err(StoreError::Deleted {
                kind: M::KIND,
                id: id.clone(),
            });
        }
        if self.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.clone(),
                expected: expected_version,
                actual: self.version,
            });
        }
        Ok(())
    }

    /// Build the next snapshot pair without touching the record.
    fn next_snapshot(
        &self,
        id: &EntityId,
        state: serde_json::Value,
        commit_type: CommitType,
        committer_id: &UserId,
        commit_message: &str,
        commit_cmds: &[M::Command],
    ) -> StoreResult<(SnapshotMetadata<M::Command>, SnapshotContent)> {
        let version = self.version + 1;
        let last = self.snapshots.last().map(|(meta, _)| meta);

        let content = SnapshotContent {
            entity_id: id.clone(),
            version,
            state,
        };
        let mut metadata = SnapshotMetadata {
            entity_id: id.clone(),
            kind: M::KIND.to_string(),
            version,
            committer_id: committer_id.clone(),
            commit_message: commit_message.to_string(),
            commit_type,
            commit_cmds: commit_cmds.to_vec(),
            timestamp: last
                .map(|meta| TemporalAnchor::after(&meta.timestamp))
                .unwrap_or_else(TemporalAnchor::now),
            content_hash: content.compute_hash()?,
            prev_hash: last.map(|meta| meta.metadata_hash),
            metadata_hash: [0; 32],
        };
        metadata.metadata_hash = metadata.compute_hash()?;
        Ok((metadata, content))
    }

    fn push(&mut self, model: M, snapshot: (SnapshotMetadata<M::Command>, SnapshotContent)) -> u64 {
        self.version = snapshot.0.version;
        self.current = model;
        self.snapshots.push(snapshot);
        self.version
    }
}

impl<M: VersionedModel> InMemoryVersionedStore<M> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState {
                entities: HashMap::new(),
            }),
        }
    }

    /// Total number of snapshots across all entities.
    pub fn snapshot_count(&self) -> StoreResult<usize> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.entities.values().map(|r| r.snapshots.len()).sum())
    }

    #[cfg(test)]
    pub(crate) fn tamper(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut Vec<(SnapshotMetadata<M::Command>, SnapshotContent)>),
    ) {
        let mut state = self.inner.write().unwrap();
        f(&mut state.entities.get_mut(id).unwrap().snapshots);
    }

    fn not_found(id: &EntityId) -> StoreError {
        StoreError::NotFound {
            kind: M::KIND,
            id: id.clone(),
        }
    }
}

impl<M: VersionedModel> Default for InMemoryVersionedStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_model<M: VersionedModel>(model: &M) -> StoreResult<serde_json::Value> {
    model.validate().map_err(|reason| StoreError::InvalidModel {
        kind: M::KIND,
        reason,
    })?;
    serde_json::to_value(model).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl<M: VersionedModel> VersionedStore<M> for InMemoryVersionedStore<M> {
    fn create(
        &self,
        id: &EntityId,
        model: &M,
        info: &CommitInfo<M::Command>,
    ) -> StoreResult<Versioned<M>> {
        let state_value = validate_model(model)?;
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if state.entities.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                kind: M::KIND,
                id: id.clone(),
            });
        }

        let mut record = EntityRecord {
            current: model.clone(),
            version: 0,
            deleted: false,
            snapshots: Vec::new(),
        };
        let snapshot = record.next_snapshot(
            id,
            state_value,
            CommitType::Create,
            &info.committer_id,
            &info.commit_message,
            &info.commit_cmds,
        )?;
        record.push(model.clone(), snapshot);

        let created = record.to_versioned(id);
        state.entities.insert(id.clone(), record);
        info!(kind = M::KIND, id = %id, committer = %info.committer_id, "created entity");
        Ok(created)
    }

    fn commit(
        &self,
        id: &EntityId,
        expected_version: u64,
        model: &M,
        info: &CommitInfo<M::Command>,
    ) -> StoreResult<u64> {
        let state_value = validate_model(model)?;
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let record = state
            .entities
            .get_mut(id)
            .ok_or_else(|| Self::not_found(id))?;
        record.check_writable(id, expected_version)?;

        let snapshot = record.next_snapshot(
            id,
            state_value,
            CommitType::Edit,
            &info.committer_id,
            &info.commit_message,
            &info.commit_cmds,
        )?;
        let version = record.push(model.clone(), snapshot);
        info!(kind = M::KIND, id = %id, version, committer = %info.committer_id, "committed version");
        Ok(version)
    }

    fn revert(
        &self,
        id: &EntityId,
        expected_version: u64,
        target_version: u64,
        committer_id: &UserId,
    ) -> StoreResult<Versioned<M>> {
        if !M::ALLOW_REVERT {
            return Err(StoreError::RevertNotAllowed { kind: M::KIND });
        }

        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let record = state
            .entities
            .get_mut(id)
            .ok_or_else(|| Self::not_found(id))?;
        record.check_writable(id, expected_version)?;

        if target_version == 0 || target_version >= record.version {
            return Err(StoreError::InvalidRevertTarget {
                id: id.clone(),
                current: record.version,
                target: target_version,
            });
        }

        let target_state = record.snapshots[(target_version - 1) as usize].1.state.clone();
        let model: M = serde_json::from_value(target_state.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let snapshot = record.next_snapshot(
            id,
            target_state,
            CommitType::Revert { target_version },
            committer_id,
            &format!("Reverted to version {target_version}"),
            &[],
        )?;
        let version = record.push(model, snapshot);
        info!(kind = M::KIND, id = %id, version, target_version, "reverted entity");
        Ok(record.to_versioned(id))
    }

    fn delete(
        &self,
        id: &EntityId,
        expected_version: u64,
        committer_id: &UserId,
        commit_message: &str,
    ) -> StoreResult<u64> {
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let record = state
            .entities
            .get_mut(id)
            .ok_or_else(|| Self::not_found(id))?;
        record.check_writable(id, expected_version)?;

        let last_state = record
            .snapshots
            .last()
            .map(|(_, content)| content.state.clone())
            .ok_or_else(|| StoreError::Integrity {
                id: id.clone(),
                version: record.version,
                reason: "entity has no snapshots".into(),
            })?;
        let snapshot = record.next_snapshot(
            id,
            last_state,
            CommitType::Delete,
            committer_id,
            commit_message,
            &[],
        )?;
        let current = record.current.clone();
        let version = record.push(current, snapshot);
        record.deleted = true;
        info!(kind = M::KIND, id = %id, version, "deleted entity");
        Ok(version)
    }

    fn get(&self, id: &EntityId) -> StoreResult<Option<Versioned<M>>> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.entities.get(id).map(|record| record.to_versioned(id)))
    }

    fn get_version(&self, id: &EntityId, version: u64) -> StoreResult<M> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let record = state.entities.get(id).ok_or_else(|| Self::not_found(id))?;
        if version == 0 || version > record.snapshots.len() as u64 {
            return Err(StoreError::VersionNotFound {
                id: id.clone(),
                version,
            });
        }
        debug!(kind = M::KIND, id = %id, version, "loading historical version");
        let content = &record.snapshots[(version - 1) as usize].1;
        serde_json::from_value(content.state.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn history(&self, id: &EntityId) -> StoreResult<Vec<SnapshotMetadata<M::Command>>> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let record = state.entities.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(record.snapshots.iter().map(|(meta, _)| meta.clone()).collect())
    }

    fn snapshots(
        &self,
        id: &EntityId,
    ) -> StoreResult<Vec<(SnapshotMetadata<M::Command>, SnapshotContent)>> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let record = state.entities.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(record.snapshots.clone())
    }

    fn all_ids(&self) -> StoreResult<Vec<EntityId>> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<_> = state.entities.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn ids(&self) -> StoreResult<Vec<EntityId>> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<_> = state
            .entities
            .iter()
            .filter(|(_, record)| !record.deleted)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub(crate) struct Counter {
        pub value: i64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "cmd", rename_all = "snake_case")]
    pub(crate) enum CounterCommand {
        Set { value: i64 },
    }

    impl VersionedModel for Counter {
        const KIND: &'static str = "counter";
        const ALLOW_REVERT: bool = true;
        type Command = CounterCommand;

        fn validate(&self) -> Result<(), String> {
            if self.value < 0 {
                return Err("value must not be negative".into());
            }
            Ok(())
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Frozen {
        label: String,
    }

    impl VersionedModel for Frozen {
        const KIND: &'static str = "frozen";
        const ALLOW_REVERT: bool = false;
        type Command = String;
    }

    pub(crate) fn eid(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    pub(crate) fn committer() -> UserId {
        UserId::new("committer_id").unwrap()
    }

    pub(crate) fn set(value: i64) -> CommitInfo<CounterCommand> {
        CommitInfo::new(committer(), format!("set to {value}"))
            .with_cmd(CounterCommand::Set { value })
    }

    #[test]
    fn create_writes_version_one() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let created = store.create(&eid("c1"), &Counter { value: 1 }, &set(1)).unwrap();
        assert_eq!(created.version, 1);
        assert!(!created.deleted);

        let history = store.history(&eid("c1")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].commit_type, CommitType::Create);
        assert_eq!(history[0].prev_hash, None);
        assert_eq!(history[0].commit_cmds, vec![CounterCommand::Set { value: 1 }]);
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        store.create(&eid("c1"), &Counter { value: 1 }, &set(1)).unwrap();
        let err = store
            .create(&eid("c1"), &Counter { value: 2 }, &set(2))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(store.snapshot_count().unwrap(), 1);
    }

    #[test]
    fn commit_increments_version_and_links_hashes() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();

        let v2 = store.commit(&id, 1, &Counter { value: 2 }, &set(2)).unwrap();
        assert_eq!(v2, 2);

        let history = store.history(&id).unwrap();
        assert_eq!(history[1].version, 2);
        assert_eq!(history[1].prev_hash, Some(history[0].metadata_hash));
        assert!(history[1].timestamp > history[0].timestamp);
        assert_eq!(store.get(&id).unwrap().unwrap().model.value, 2);
    }

    #[test]
    fn stale_commit_is_a_version_conflict() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();
        store.commit(&id, 1, &Counter { value: 2 }, &set(2)).unwrap();

        let err = store.commit(&id, 1, &Counter { value: 3 }, &set(3)).unwrap_err();
        assert_eq!(
            err,
            StoreError::VersionConflict {
                id: id.clone(),
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(store.history(&id).unwrap().len(), 2);
    }

    #[test]
    fn invalid_model_writes_no_snapshot() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();

        let err = store.commit(&id, 1, &Counter { value: -1 }, &set(-1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidModel { kind: "counter", .. }));
        assert_eq!(store.get(&id).unwrap().unwrap().version, 1);
        assert_eq!(store.history(&id).unwrap().len(), 1);
    }

    #[test]
    fn commit_to_missing_entity_fails() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let err = store.commit(&eid("nope"), 1, &Counter { value: 1 }, &set(1)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn history_and_snapshots_of_missing_entity_are_not_found() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        assert!(matches!(
            store.history(&eid("nope")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.snapshots(&eid("nope")).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn get_version_returns_historical_state() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();
        store.commit(&id, 1, &Counter { value: 5 }, &set(5)).unwrap();

        assert_eq!(store.get_version(&id, 1).unwrap().value, 1);
        assert_eq!(store.get_version(&id, 2).unwrap().value, 5);
        assert!(matches!(
            store.get_version(&id, 3).unwrap_err(),
            StoreError::VersionNotFound { version: 3, .. }
        ));
        assert!(store.get_version(&id, 0).is_err());
    }

    #[test]
    fn revert_appends_new_version_with_old_content() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();
        store.commit(&id, 1, &Counter { value: 2 }, &set(2)).unwrap();
        store.commit(&id, 2, &Counter { value: 3 }, &set(3)).unwrap();

        let reverted = store.revert(&id, 3, 1, &committer()).unwrap();
        assert_eq!(reverted.version, 4);
        assert_eq!(reverted.model.value, 1);

        let history = store.history(&id).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].commit_type, CommitType::Revert { target_version: 1 });
        assert_eq!(history[3].commit_message, "Reverted to version 1");
        assert_eq!(history[3].content_hash, {
            let snaps = store.snapshots(&id).unwrap();
            let mut c = snaps[0].1.clone();
            c.version = 4;
            c.compute_hash().unwrap()
        });
        // Intervening history is kept.
        assert_eq!(store.get_version(&id, 3).unwrap().value, 3);
    }

    #[test]
    fn revert_rejects_bad_targets() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();
        store.commit(&id, 1, &Counter { value: 2 }, &set(2)).unwrap();

        for target in [0, 2, 3] {
            let err = store.revert(&id, 2, target, &committer()).unwrap_err();
            assert!(matches!(err, StoreError::InvalidRevertTarget { .. }));
        }
        assert_eq!(store.history(&id).unwrap().len(), 2);
    }

    #[test]
    fn revert_not_allowed_for_frozen_kind() {
        let store: InMemoryVersionedStore<Frozen> = InMemoryVersionedStore::new();
        let id = eid("f1");
        let info = CommitInfo::new(committer(), "create");
        store.create(&id, &Frozen { label: "a".into() }, &info).unwrap();
        store.commit(&id, 1, &Frozen { label: "b".into() }, &info).unwrap();

        let err = store.revert(&id, 2, 1, &committer()).unwrap_err();
        assert_eq!(err, StoreError::RevertNotAllowed { kind: "frozen" });
        assert_eq!(store.history(&id).unwrap().len(), 2);
    }

    #[test]
    fn delete_is_soft_and_blocks_further_commits() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();

        let version = store.delete(&id, 1, &committer(), "remove").unwrap();
        assert_eq!(version, 2);

        let entity = store.get(&id).unwrap().unwrap();
        assert!(entity.deleted);
        assert_eq!(store.history(&id).unwrap()[1].commit_type, CommitType::Delete);

        let err = store.commit(&id, 2, &Counter { value: 4 }, &set(4)).unwrap_err();
        assert!(matches!(err, StoreError::Deleted { .. }));
        assert!(matches!(store.get_live(&id).unwrap_err(), StoreError::Deleted { .. }));
    }

    #[test]
    fn ids_and_count_skip_deleted() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        store.create(&eid("b"), &Counter { value: 1 }, &set(1)).unwrap();
        store.create(&eid("a"), &Counter { value: 1 }, &set(1)).unwrap();
        store.create(&eid("c"), &Counter { value: 1 }, &set(1)).unwrap();
        store.delete(&eid("c"), 1, &committer(), "gone").unwrap();

        assert_eq!(store.ids().unwrap(), vec![eid("a"), eid("b")]);
        assert_eq!(store.all_ids().unwrap(), vec![eid("a"), eid("b"), eid("c")]);
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn save_advances_instance_version() {
        let store: InMemoryVersionedStore<Counter> = InMemoryVersionedStore::new();
        let mut counter = store.create(&eid("c1"), &Counter { value: 1 }, &set(1)).unwrap();
        counter.model.value = 9;
        counter.save(&store, &set(9)).unwrap();
        assert_eq!(counter.version, 2);
        assert_eq!(store.get(&eid("c1")).unwrap().unwrap(), counter);
    }
}
