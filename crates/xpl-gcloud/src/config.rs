use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GcloudError, GcloudResult};

/// Settings for the deployment adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcloudConfig {
    /// The `gcloud` executable, as a path or a name looked up on `PATH`.
    pub gcloud_path: PathBuf,
    /// Installation directory of the Google Cloud SDK.
    pub sdk_home: PathBuf,
    /// Project used when a command does not name one.
    pub project: Option<String>,
    pub default_service: String,
    /// Service whose newest version always receives all of its traffic
    /// after a switch.
    pub admin_service: String,
}

impl Default for GcloudConfig {
    fn default() -> Self {
        Self {
            gcloud_path: PathBuf::from("gcloud"),
            sdk_home: PathBuf::from("../oppia_tools/google-cloud-sdk"),
            project: None,
            default_service: "default".into(),
            admin_service: "cloud-datastore-admin".into(),
        }
    }
}

impl GcloudConfig {
    pub fn from_toml_str(s: &str) -> GcloudResult<Self> {
        toml::from_str(s).map_err(|e| GcloudError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> GcloudResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> GcloudResult<String> {
        toml::to_string_pretty(self).map_err(|e| GcloudError::Config(e.to_string()))
    }

    /// Replace the project if `project` is given.
    pub fn with_project(mut self, project: Option<String>) -> Self {
        if project.is_some() {
            self.project = project;
        }
        self
    }
}
