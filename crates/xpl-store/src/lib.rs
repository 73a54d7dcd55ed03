//! Versioned entity store for the Exploration Ledger (XPL).
//!
//! Every committed change to an entity produces exactly one immutable
//! snapshot: a [`SnapshotMetadata`] record describing the change and a
//! [`SnapshotContent`] record holding the full serialized entity state.
//! Snapshots are append-only and hash-linked, so the history of an entity
//! can be re-verified at any time.
//!
//! This crate provides:
//! - The [`VersionedModel`] trait implemented by every stored entity
//! - The [`VersionedStore`] trait boundary
//! - [`InMemoryVersionedStore`] for tests and embedding
//! - [`HistoryValidator`] for snapshot-chain integrity checks

pub mod error;
pub mod memory;
pub mod model;
pub mod records;
pub mod traits;
pub mod validation;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryVersionedStore;
pub use model::{CommitInfo, Versioned, VersionedModel};
pub use records::{CommitType, SnapshotContent, SnapshotMetadata};
pub use traits::VersionedStore;
pub use validation::{HistoryReport, HistoryValidator, Violation, ViolationKind};
