//! Working tree errors and per-entry faults

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("reference tree not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("full sync requested but no reference tree was configured")]
    NoReference,

    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A failure on one top-level entry that did not stop the operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFault {
    pub name: String,
    pub error: String,
}

impl EntryFault {
    pub fn new(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            error: error.to_string(),
        }
    }
}
