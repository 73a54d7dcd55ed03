//! Foundation types for the Exploration Ledger (XPL).
//!
//! Every other XPL crate depends on `xpl-types`.
//!
//! # Key Types
//!
//! - [`EntityId`]: Stable identifier of a versioned entity
//! - [`UserId`]: Identifier of a user acting as committer, owner, editor or viewer
//! - [`TemporalAnchor`]: Monotone timestamp attached to every snapshot

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::TypeError;
pub use identity::{EntityId, UserId, MAX_ID_LEN};
pub use temporal::TemporalAnchor;
