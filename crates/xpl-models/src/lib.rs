//! Exploration models for the Exploration Ledger (XPL).
//!
//! An exploration is a versioned piece of learning content made of named
//! states. Each exploration has a companion rights record, stored under the
//! same id, that tracks who may own, edit, or view it and whether it has
//! been published.
//!
//! # Modules
//!
//! - [`exploration`]: The [`Exploration`] model and its state graph
//! - [`params`]: Parameter specifications and parameter changes
//! - [`property`]: The static whitelist of mutable exploration properties
//! - [`rights`]: The [`ExplorationRights`] model
//! - [`commands`]: Commit commands recorded with every change
//! - [`repository`]: [`ExplorationRepository`], the put/query entry point

pub mod commands;
pub mod error;
pub mod exploration;
pub mod params;
pub mod property;
pub mod repository;
pub mod rights;

pub use commands::{ExplorationCommand, RightsCommand};
pub use error::{ModelError, ModelResult};
pub use exploration::{
    AnswerRule, Content, Exploration, Interaction, State, DEFAULT_SKIN, END_DEST,
    MAX_CHAR_FIELD_LEN,
};
pub use params::{Generator, ObjType, ParamChange, ParamSpec};
pub use property::{ExplorationChange, ExplorationProperty};
pub use repository::{ExplorationRepository, InMemoryExplorationRepository};
pub use rights::{ExplorationRights, RightsStatus, Role};
