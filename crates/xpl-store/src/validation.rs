use xpl_types::EntityId;

use crate::error::StoreResult;
use crate::model::VersionedModel;
use crate::records::CommitType;
use crate::traits::VersionedStore;

/// Result of checking one entity's snapshot history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryReport {
    pub entity_id: EntityId,
    pub snapshot_count: u64,
    pub violations: Vec<Violation>,
}

impl HistoryReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub version: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    VersionGap,
    HashChainBreak,
    MetadataHashMismatch,
    ContentHashMismatch,
    ContentMismatch,
    MissingCreate,
    InvalidRevertTarget,
    CommitAfterDelete,
    TimestampRegression,
}

/// Snapshot history validator.
pub struct HistoryValidator;

impl HistoryValidator {
    /// Validate the snapshot history of a single entity.
    pub fn validate_history<M, S>(store: &S, id: &EntityId) -> StoreResult<HistoryReport>
    where
        M: VersionedModel,
        S: VersionedStore<M> + ?Sized,
    {
        let snapshots = store.snapshots(id)?;
        let mut violations = Vec::new();
        let mut push = |version: u64, kind: ViolationKind, description: String| {
            violations.push(Violation {
                version,
                kind,
                description,
            });
        };

        for (index, (meta, content)) in snapshots.iter().enumerate() {
            let expected_version = (index + 1) as u64;
            if meta.version != expected_version {
                push(
                    meta.version,
                    ViolationKind::VersionGap,
                    format!("expected version {expected_version}, got {}", meta.version),
                );
            }

            if meta.entity_id != *id || content.entity_id != *id || content.version != meta.version
            {
                push(
                    meta.version,
                    ViolationKind::ContentMismatch,
                    "snapshot content does not belong to this metadata".into(),
                );
            }

            if index == 0 && !meta.commit_type.is_create() {
                push(
                    meta.version,
                    ViolationKind::MissingCreate,
                    "first snapshot is not a create".into(),
                );
            }

            let previous = index.checked_sub(1).map(|i| &snapshots[i].0);
            if meta.prev_hash != previous.map(|p| p.metadata_hash) {
                push(
                    meta.version,
                    ViolationKind::HashChainBreak,
                    "previous hash link mismatch".into(),
                );
            }

            if let Some(prev) = previous {
                if prev.commit_type.is_delete() {
                    push(
                        meta.version,
                        ViolationKind::CommitAfterDelete,
                        "snapshot follows a delete".into(),
                    );
                }
                if !meta.timestamp.is_after(&prev.timestamp) {
                    push(
                        meta.version,
                        ViolationKind::TimestampRegression,
                        "timestamp does not advance".into(),
                    );
                }
            }

            if let CommitType::Revert { target_version } = meta.commit_type {
                if target_version == 0 || target_version >= meta.version {
                    push(
                        meta.version,
                        ViolationKind::InvalidRevertTarget,
                        format!("revert target {target_version} is not an earlier version"),
                    );
                }
            }

            if meta.compute_hash()? != meta.metadata_hash {
                push(
                    meta.version,
                    ViolationKind::MetadataHashMismatch,
                    "metadata hash does not match computed".into(),
                );
            }

            if content.compute_hash()? != meta.content_hash {
                push(
                    meta.version,
                    ViolationKind::ContentHashMismatch,
                    "content hash does not match computed".into(),
                );
            }
        }

        Ok(HistoryReport {
            entity_id: id.clone(),
            snapshot_count: snapshots.len() as u64,
            violations,
        })
    }

    /// Validate every entity in the store, deleted ones included.
    pub fn validate_all<M, S>(store: &S) -> StoreResult<Vec<HistoryReport>>
    where
        M: VersionedModel,
        S: VersionedStore<M> + ?Sized,
    {
        store
            .all_ids()?
            .iter()
            .map(|id| Self::validate_history::<M, S>(store, id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::tests::{committer, eid, set, Counter};
    use crate::memory::InMemoryVersionedStore;

    fn populated() -> InMemoryVersionedStore<Counter> {
        let store = InMemoryVersionedStore::new();
        let id = eid("c1");
        store.create(&id, &Counter { value: 1 }, &set(1)).unwrap();
        store.commit(&id, 1, &Counter { value: 2 }, &set(2)).unwrap();
        store.revert(&id, 2, 1, &committer()).unwrap();
        store.delete(&id, 3, &committer(), "done").unwrap();
        store
    }

    #[test]
    fn full_lifecycle_is_valid() {
        let store = populated();
        let report = HistoryValidator::validate_history(&store, &eid("c1")).unwrap();
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.snapshot_count, 4);
    }

    #[test]
    fn unknown_entity_is_not_found() {
        let store = populated();
        let err = HistoryValidator::validate_history(&store, &eid("missing")).unwrap_err();
        assert!(matches!(err, crate::error::StoreError::NotFound { .. }));
    }

    #[test]
    fn tampered_content_is_detected() {
        let store = populated();
        store.tamper(&eid("c1"), |snapshots| {
            snapshots[1].1.state = json!({"value": 999});
        });

        let report = HistoryValidator::validate_history(&store, &eid("c1")).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.violations[0].kind, ViolationKind::ContentHashMismatch);
        assert_eq!(report.violations[0].version, 2);
    }

    #[test]
    fn tampered_message_breaks_metadata_hash() {
        let store = populated();
        store.tamper(&eid("c1"), |snapshots| {
            snapshots[0].0.commit_message = "rewritten".into();
        });

        let report = HistoryValidator::validate_history(&store, &eid("c1")).unwrap();
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind.clone()).collect();
        assert!(kinds.contains(&ViolationKind::MetadataHashMismatch));
    }

    #[test]
    fn validate_all_covers_every_entity() {
        let store = populated();
        store.create(&eid("c2"), &Counter { value: 7 }, &set(7)).unwrap();
        let reports = HistoryValidator::validate_all(&store).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(HistoryReport::is_valid));
    }
}
