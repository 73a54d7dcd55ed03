use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcloudError {
    #[error("gcloud required, but could not be found. Please install the Google Cloud SDK.")]
    Unavailable,

    #[error("missing indexes file: {}", .0.display())]
    MissingIndexFile(PathBuf),

    #[error("Google Cloud SDK home does not exist: {}", .0.display())]
    SdkHomeMissing(PathBuf),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected gcloud output: {0}")]
    UnexpectedOutput(String),

    #[error("no deployed versions for service {0}")]
    NoVersions(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GcloudResult<T> = Result<T, GcloudError>;
