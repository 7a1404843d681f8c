use serde::Serialize;

/// Result of one version-control invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Exit status zero
    Success,
    /// Tool refused because the tree had no changes; harmless
    NothingToCommit,
    /// Any other non-zero exit
    Failed { exit_code: i32, stderr: String },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success)
    }

    pub fn is_benign_noop(&self) -> bool {
        matches!(self, ToolOutcome::NothingToCommit)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutcome::Failed { .. })
    }
}
