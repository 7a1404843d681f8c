//! Per-run outcome record
//!
//! Every tool invocation and per-entry filesystem fault lands here, so a
//! run that produced fewer real commits than steps is visible to the
//! caller instead of only in the logs.

use bd_core::Timestamp;
use serde::Serialize;
use std::path::PathBuf;
use vcs::ToolOutcome;
use worktree::{EntryFault, MutationReport, WipeReport};

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based position in the plan
    pub index: usize,
    pub message: String,
    pub timestamp: Timestamp,
    pub mutation: MutationReport,
    pub stage: ToolOutcome,
    pub commit: ToolOutcome,
    /// Content digest of the tree as committed
    pub tree_digest: Option<String>,
}

impl StepReport {
    /// Faults on individual entries during this step's reference sync
    pub fn entry_faults(&self) -> &[EntryFault] {
        match &self.mutation {
            MutationReport::FullSync(sync) => &sync.faults,
            _ => &[],
        }
    }
}

/// A tool invocation that exited non-zero for a reason other than
/// "nothing to commit"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    /// `None` for the initial `init`
    pub step: Option<usize>,
    pub operation: &'static str,
    pub exit_code: i32,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub reference: PathBuf,
    pub init: ToolOutcome,
    pub wipe: WipeReport,
    pub steps: Vec<StepReport>,
    pub intended_commits: usize,
    /// Commits reachable from HEAD after the run, when the tool could say
    pub recorded_commits: Option<usize>,
}

impl RunReport {
    pub fn failures(&self) -> Vec<ToolFailure> {
        let mut failures = Vec::new();
        push_failure(&mut failures, None, "init", &self.init);
        for step in &self.steps {
            push_failure(&mut failures, Some(step.index), "add", &step.stage);
            push_failure(&mut failures, Some(step.index), "commit", &step.commit);
        }
        failures
    }

    /// Steps whose commit was refused as "nothing to commit"
    pub fn benign_noops(&self) -> usize {
        self.steps.iter().filter(|s| s.commit.is_benign_noop()).count()
    }

    pub fn entry_faults(&self) -> usize {
        self.wipe.faults.len() + self.steps.iter().map(|s| s.entry_faults().len()).sum::<usize>()
    }

    /// Whether the log verifiably holds one commit per step
    pub fn commits_verified(&self) -> bool {
        self.recorded_commits == Some(self.intended_commits)
    }

    pub fn is_clean(&self) -> bool {
        self.failures().is_empty() && self.entry_faults() == 0 && self.commits_verified()
    }
}

fn push_failure(
    failures: &mut Vec<ToolFailure>,
    step: Option<usize>,
    operation: &'static str,
    outcome: &ToolOutcome,
) {
    if let ToolOutcome::Failed { exit_code, stderr } = outcome {
        failures.push(ToolFailure {
            step,
            operation,
            exit_code: *exit_code,
            detail: stderr.clone(),
        });
    }
}
