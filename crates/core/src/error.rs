//! Plan construction and loading errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid timestamp '{0}' (expected YYYY-MM-DD HH:MM:SS)")]
    Timestamp(String),

    #[error("invalid path '{path}': {reason}")]
    Path { path: String, reason: &'static str },

    #[error("step {step}: path '{path}' appears more than once")]
    DuplicatePath { step: usize, path: String },

    #[error("step {step}: path '{path}' enters protected entry '{name}'")]
    ProtectedPath {
        step: usize,
        path: String,
        name: String,
    },

    #[error("plan has no steps")]
    Empty,

    #[error("step {step}: commit message is empty")]
    EmptyMessage { step: usize },

    #[error("the final step must be a full sync with the reference tree")]
    MissingFinalSync,

    #[error("step {step}: full sync is only allowed as the final step")]
    SyncNotTerminal { step: usize },

    #[error("step {step}: {reason}")]
    InvalidStep { step: usize, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
