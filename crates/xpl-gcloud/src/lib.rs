//! Deployment adapter for the Exploration Ledger (XPL).
//!
//! Wraps the `gcloud` command-line tool for the release workflow. It covers
//! datastore index upload and status, App Engine version lookup, traffic
//! switching, and deploys. Every call blocks until `gcloud` exits.
//!
//! # Modules
//!
//! - [`config`]: [`GcloudConfig`], loaded from TOML
//! - [`runner`]: The [`CommandRunner`] seam and the process-backed [`SystemRunner`]
//! - [`index`]: Parsed `gcloud --format=json` listings
//! - [`adapter`]: [`Gcloud`], one method per release operation

pub mod adapter;
pub mod config;
pub mod error;
pub mod index;
pub mod runner;

pub use adapter::{initialize, Gcloud};
pub use config::GcloudConfig;
pub use error::{GcloudError, GcloudResult};
pub use index::{IndexDescription, IndexProperty, IndexState, VersionDescription};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
