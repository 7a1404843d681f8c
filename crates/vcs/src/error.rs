//! Errors that stop the version-control tool from being used

use std::path::PathBuf;
use thiserror::Error;

/// Failures that make the version-control tool unusable for the run
///
/// A tool that starts and exits non-zero is not an error here; that is
/// reported as [`crate::ToolOutcome::Failed`].
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to launch '{program}': {source}. Is it installed and on PATH?")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove existing metadata at {}: {source}", .path.display())]
    ResetMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
