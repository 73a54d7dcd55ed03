use serde_json::{Map, Value};
use tracing::{info, warn};
use xpl_store::{
    CommitInfo, HistoryReport, HistoryValidator, InMemoryVersionedStore, SnapshotMetadata,
    StoreError, Versioned, VersionedStore,
};
use xpl_types::{EntityId, UserId};

use crate::commands::{ExplorationCommand, RightsCommand};
use crate::error::{ModelError, ModelResult};
use crate::exploration::Exploration;
use crate::property::ExplorationChange;
use crate::rights::{ExplorationRights, RightsStatus};

/// Entry point for reading and writing explorations and their rights.
///
/// Both stores key entities by the exploration id. Every write goes through
/// optimistic concurrency: the caller's instance carries the version it was
/// loaded at, and a stale instance is rejected with a version conflict.
pub struct ExplorationRepository<E, R> {
    explorations: E,
    rights: R,
}

/// Repository backed by two in-memory stores.
pub type InMemoryExplorationRepository = ExplorationRepository<
    InMemoryVersionedStore<Exploration>,
    InMemoryVersionedStore<ExplorationRights>,
>;

impl InMemoryExplorationRepository {
    pub fn in_memory() -> Self {
        Self::new(InMemoryVersionedStore::new(), InMemoryVersionedStore::new())
    }
}

impl<E, R> ExplorationRepository<E, R>
where
    E: VersionedStore<Exploration>,
    R: VersionedStore<ExplorationRights>,
{
    pub fn new(explorations: E, rights: R) -> Self {
        Self {
            explorations,
            rights,
        }
    }

    pub fn explorations(&self) -> &E {
        &self.explorations
    }

    pub fn rights(&self) -> &R {
        &self.rights
    }

    /// Create an exploration and its rights record, both at version 1.
    ///
    /// Fails without writing anything if either id is already taken.
    pub fn create_exploration(
        &self,
        id: &EntityId,
        exploration: &Exploration,
        rights: &ExplorationRights,
        committer_id: &str,
        commit_message: &str,
    ) -> ModelResult<(Versioned<Exploration>, Versioned<ExplorationRights>)> {
        let committer = parse_committer(committer_id)?;
        exploration.check()?;
        if self.explorations.get(id)?.is_some() || self.rights.get(id)?.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: "exploration",
                id: id.clone(),
            }
            .into());
        }

        let exploration_info = CommitInfo::new(committer.clone(), commit_message).with_cmd(
            ExplorationCommand::CreateNew {
                title: exploration.title.clone(),
                category: exploration.category.clone(),
            },
        );
        let created = self.explorations.create(id, exploration, &exploration_info)?;

        let rights_info =
            CommitInfo::new(committer, commit_message).with_cmd(RightsCommand::CreateNew);
        let created_rights = self.rights.create(id, rights, &rights_info)?;

        info!(id = %id, "created exploration");
        Ok((created, created_rights))
    }

    pub fn get_exploration(&self, id: &EntityId) -> ModelResult<Versioned<Exploration>> {
        Ok(self.explorations.get_live(id)?)
    }

    pub fn get_rights(&self, id: &EntityId) -> ModelResult<Versioned<ExplorationRights>> {
        Ok(self.rights.get_live(id)?)
    }

    /// Merge `change` into `exploration` and commit it as the next version.
    ///
    /// The committer and the merged exploration are checked before anything
    /// is written. On error `exploration` is left exactly as it was and no
    /// version is created. When `commit_cmds` is empty the commands are
    /// derived from the change.
    pub fn put_exploration(
        &self,
        exploration: &mut Versioned<Exploration>,
        committer_id: &str,
        change: &ExplorationChange,
        commit_message: &str,
        commit_cmds: Vec<ExplorationCommand>,
    ) -> ModelResult<u64> {
        let committer = parse_committer(committer_id)?;
        self.commit_change(exploration, committer, change, commit_message, commit_cmds)
    }

    /// [`put_exploration`](Self::put_exploration) for a loosely typed
    /// properties dict. Every key must name an
    /// [`ExplorationProperty`](crate::ExplorationProperty).
    pub fn put_exploration_properties(
        &self,
        exploration: &mut Versioned<Exploration>,
        committer_id: &str,
        properties: Option<&Map<String, Value>>,
        commit_message: &str,
        commit_cmds: Vec<ExplorationCommand>,
    ) -> ModelResult<u64> {
        let committer = parse_committer(committer_id)?;
        let change = match ExplorationChange::from_properties(properties) {
            Ok(change) => change,
            Err(e) => {
                warn!(id = %exploration.id, error = %e, "rejected exploration properties");
                return Err(e);
            }
        };
        self.commit_change(exploration, committer, &change, commit_message, commit_cmds)
    }

    fn commit_change(
        &self,
        exploration: &mut Versioned<Exploration>,
        committer: UserId,
        change: &ExplorationChange,
        commit_message: &str,
        commit_cmds: Vec<ExplorationCommand>,
    ) -> ModelResult<u64> {
        let merged = change.apply_to(&exploration.model);
        if let Err(e) = merged.check() {
            warn!(id = %exploration.id, error = %e, "rejected exploration put");
            return Err(e);
        }

        let commit_cmds = if commit_cmds.is_empty() {
            change.to_commands(&exploration.model)?
        } else {
            commit_cmds
        };
        let info = CommitInfo::new(committer, commit_message).with_cmds(commit_cmds);
        let version =
            self.explorations
                .commit(&exploration.id, exploration.version, &merged, &info)?;

        exploration.model = merged;
        exploration.version = version;
        Ok(version)
    }

    /// Commit the in-memory rights as the next version.
    pub fn put_rights(
        &self,
        rights: &mut Versioned<ExplorationRights>,
        committer_id: &str,
        commit_message: &str,
        commit_cmds: Vec<RightsCommand>,
    ) -> ModelResult<u64> {
        let committer = parse_committer(committer_id)?;
        let info = CommitInfo::new(committer, commit_message).with_cmds(commit_cmds);
        Ok(rights.save(&self.rights, &info)?)
    }

    /// Write a new exploration version whose content equals `target_version`.
    pub fn revert_exploration(
        &self,
        id: &EntityId,
        current_version: u64,
        target_version: u64,
        committer_id: &str,
    ) -> ModelResult<Versioned<Exploration>> {
        let committer = parse_committer(committer_id)?;
        Ok(self
            .explorations
            .revert(id, current_version, target_version, &committer)?)
    }

    /// Soft-delete an exploration and its rights. History is kept.
    ///
    /// A side that is already deleted is left alone, so a delete that failed
    /// halfway can be retried. Fails with not-found only when neither record
    /// exists.
    pub fn delete_exploration(
        &self,
        id: &EntityId,
        committer_id: &str,
        commit_message: &str,
    ) -> ModelResult<()> {
        let committer = parse_committer(committer_id)?;
        let exploration = self.explorations.get(id)?;
        let rights = self.rights.get(id)?;
        if exploration.is_none() && rights.is_none() {
            return Err(StoreError::NotFound {
                kind: "exploration",
                id: id.clone(),
            }
            .into());
        }

        if let Some(exploration) = exploration.filter(|e| !e.deleted) {
            self.explorations
                .delete(id, exploration.version, &committer, commit_message)?;
        }
        if let Some(rights) = rights.filter(|r| !r.deleted) {
            self.rights
                .delete(id, rights.version, &committer, commit_message)?;
        }
        info!(id = %id, "deleted exploration");
        Ok(())
    }

    /// Live explorations whose rights status is exactly `public`, by id.
    ///
    /// Rights whose exploration is missing or deleted are skipped.
    pub fn get_public_explorations(&self) -> ModelResult<Vec<Versioned<Exploration>>> {
        let mut public = Vec::new();
        for rights in self.rights.list()? {
            if rights.model.status != RightsStatus::Public {
                continue;
            }
            match self.explorations.get(&rights.id)? {
                Some(exploration) if !exploration.deleted => public.push(exploration),
                _ => warn!(id = %rights.id, "public rights without a live exploration"),
            }
        }
        Ok(public)
    }

    /// Number of live explorations. Soft-deleted explorations are not
    /// counted.
    pub fn get_exploration_count(&self) -> ModelResult<u64> {
        Ok(self.explorations.count()?)
    }

    pub fn exploration_history(
        &self,
        id: &EntityId,
    ) -> ModelResult<Vec<SnapshotMetadata<ExplorationCommand>>> {
        Ok(self.explorations.history(id)?)
    }

    pub fn rights_history(&self, id: &EntityId) -> ModelResult<Vec<SnapshotMetadata<RightsCommand>>> {
        Ok(self.rights.history(id)?)
    }

    /// Check the snapshot chains of both the exploration and its rights.
    pub fn verify(&self, id: &EntityId) -> ModelResult<(HistoryReport, HistoryReport)> {
        let exploration = HistoryValidator::validate_history::<Exploration, E>(&self.explorations, id)?;
        let rights = HistoryValidator::validate_history::<ExplorationRights, R>(&self.rights, id)?;
        Ok((exploration, rights))
    }
}

fn parse_committer(committer_id: &str) -> ModelResult<UserId> {
    UserId::new(committer_id).map_err(|_| {
        warn!(committer = committer_id, "rejected committer id");
        ModelError::InvalidArgument(format!("invalid committer id: {committer_id:?}"))
    })
}
