//! Version-control boundary for backdate
//!
//! This crate provides:
//! - The `VersionControl` trait (initialize, stage, timestamped commit)
//! - A git implementation driven through the command line
//! - Explicit per-operation outcomes instead of log-and-continue

pub mod error;
pub mod git;
pub mod outcome;
pub mod process;

use bd_core::Timestamp;
use std::path::Path;

// Re-exports
pub use error::VcsError;
pub use git::{GitAdapter, Identity};
pub use outcome::ToolOutcome;
pub use process::{ProcessOutput, ProcessRequest, ProcessRunner, SystemRunner};

/// One commit to record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub message: String,
    /// Used for both author and committer time
    pub timestamp: Timestamp,
    pub allow_empty: bool,
}

/// Stage-and-commit operations against a repository rooted at `root`
///
/// `Err` means the tool could not be used at all. A tool that ran and
/// failed comes back as `Ok(ToolOutcome::Failed { .. })`.
pub trait VersionControl {
    /// Drop any existing history and start an empty repository
    fn initialize(&self, root: &Path) -> Result<ToolOutcome, VcsError>;

    /// Stage every addition, modification and deletion
    fn stage_all(&self, root: &Path) -> Result<ToolOutcome, VcsError>;

    fn commit(&self, root: &Path, request: &CommitRequest) -> Result<ToolOutcome, VcsError>;

    /// Commits reachable from HEAD, if the tool can tell
    fn commit_count(&self, root: &Path) -> Result<Option<usize>, VcsError>;
}
