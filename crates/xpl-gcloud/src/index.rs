//! Typed views of `gcloud ... --format=json` listings.
//!
//! Only the fields the release workflow reads are modelled. Everything else
//! in gcloud's output is ignored so that new fields do not break parsing.

use serde::{Deserialize, Serialize};

/// Serving state of a datastore index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexState {
    Ready,
    Other(String),
}

impl IndexState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl From<String> for IndexState {
    fn from(s: String) -> Self {
        if s == "READY" {
            Self::Ready
        } else {
            Self::Other(s)
        }
    }
}

impl From<IndexState> for String {
    fn from(state: IndexState) -> Self {
        match state {
            IndexState::Ready => "READY".into(),
            IndexState::Other(s) => s,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexProperty {
    pub name: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// One datastore composite index as listed by gcloud.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescription {
    pub state: IndexState,
    #[serde(default, alias = "id")]
    pub index_id: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub ancestor: Option<String>,
    #[serde(default)]
    pub properties: Vec<IndexProperty>,
}

/// One App Engine version as listed by gcloud.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescription {
    pub id: String,
}
