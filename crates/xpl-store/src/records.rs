use serde::{Deserialize, Serialize};
use serde_json::Value;
use xpl_types::{EntityId, TemporalAnchor, UserId};

use crate::error::{StoreError, StoreResult};

/// The kind of version transition a snapshot records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommitType {
    Create,
    Edit,
    Revert { target_version: u64 },
    Delete,
}

impl CommitType {
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// Immutable description of one version transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata<C> {
    pub entity_id: EntityId,
    pub kind: String,
    /// Version number the entity has after this transition.
    pub version: u64,
    pub committer_id: UserId,
    pub commit_message: String,
    pub commit_type: CommitType,
    pub commit_cmds: Vec<C>,
    pub timestamp: TemporalAnchor,
    pub content_hash: [u8; 32],
    pub prev_hash: Option<[u8; 32]>,
    pub metadata_hash: [u8; 32],
}

impl<C: Serialize + Clone> SnapshotMetadata<C> {
    /// Snapshot identifier in `{entity_id}-{version}` form.
    pub fn snapshot_id(&self) -> String {
        format!("{}-{}", self.entity_id, self.version)
    }

    pub fn metadata_hash_hex(&self) -> String {
        hex::encode(self.metadata_hash)
    }

    /// Hash of this record with `metadata_hash` zeroed.
    pub fn compute_hash(&self) -> StoreResult<[u8; 32]> {
        let mut canonical = self.clone();
        canonical.metadata_hash = [0; 32];
        hash_with_domain(b"xpl-snapshot-metadata-v1:", &canonical)
    }
}

/// Full serialized entity state at one version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContent {
    pub entity_id: EntityId,
    pub version: u64,
    pub state: Value,
}

impl SnapshotContent {
    pub fn compute_hash(&self) -> StoreResult<[u8; 32]> {
        hash_with_domain(b"xpl-snapshot-content-v1:", self)
    }
}

fn hash_with_domain<T: Serialize>(domain: &[u8], value: &T) -> StoreResult<[u8; 32]> {
    let encoded =
        serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    hasher.update(&encoded);
    Ok(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata() -> SnapshotMetadata<String> {
        SnapshotMetadata {
            entity_id: EntityId::new("eid").unwrap(),
            kind: "test".into(),
            version: 3,
            committer_id: UserId::new("committer").unwrap(),
            commit_message: "msg".into(),
            commit_type: CommitType::Edit,
            commit_cmds: vec!["cmd".into()],
            timestamp: TemporalAnchor::new(10, 0),
            content_hash: [1; 32],
            prev_hash: Some([2; 32]),
            metadata_hash: [0; 32],
        }
    }

    #[test]
    fn snapshot_id_joins_entity_and_version() {
        assert_eq!(metadata().snapshot_id(), "eid-3");
    }

    #[test]
    fn metadata_hash_ignores_stored_hash() {
        let mut a = metadata();
        let h = a.compute_hash().unwrap();
        a.metadata_hash = h;
        assert_eq!(a.compute_hash().unwrap(), h);
    }

    #[test]
    fn metadata_hash_covers_commit_message() {
        let a = metadata();
        let mut b = metadata();
        b.commit_message = "other".into();
        assert_ne!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
    }

    #[test]
    fn content_hash_covers_state() {
        let a = SnapshotContent {
            entity_id: EntityId::new("eid").unwrap(),
            version: 1,
            state: json!({"value": 1}),
        };
        let mut b = a.clone();
        b.state = json!({"value": 2});
        assert_ne!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
    }

    #[test]
    fn commit_type_serializes_tagged() {
        let revert = CommitType::Revert { target_version: 2 };
        let value = serde_json::to_value(&revert).unwrap();
        assert_eq!(value, json!({"type": "revert", "target_version": 2}));
    }
}
