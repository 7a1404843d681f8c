//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use bd_core::{FileChange, Mutation, ProtectedSet, SnapshotStep};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use vcs::ToolOutcome;

/// Directory holding the plan file; the default working tree root
pub fn plan_dir(plan: &Path) -> PathBuf {
    match plan.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Refuse to wipe a directory that holds unrelated work
///
/// Passes when `root` is missing, empty apart from protected names, or
/// already a git repository.
pub fn ensure_safe_root(root: &Path, protected: &ProtectedSet) -> Result<()> {
    if !root.exists() || root.join(".git").exists() {
        return Ok(());
    }

    let mut foreign = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("Failed to read {}", root.display()))?
    {
        let name = entry?.file_name();
        if !protected.contains_os(&name) {
            foreign.push(name.to_string_lossy().into_owned());
        }
    }

    if foreign.is_empty() {
        return Ok(());
    }

    foreign.sort();
    anyhow::bail!(
        "Refusing to wipe {}: it is not a git repository and contains {} unprotected entr{} ({}).\n\
         Everything except protected names will be deleted. Re-run with --yes to proceed.",
        root.display(),
        foreign.len(),
        if foreign.len() == 1 { "y" } else { "ies" },
        foreign.join(", ")
    )
}

/// Short description of what a step does to the tree
pub fn describe_mutation(step: &SnapshotStep) -> String {
    match &step.mutation {
        Mutation::Sparse(files) => {
            let writes = step.write_count();
            let skips = files.values().filter(|c| matches!(c, FileChange::Skip)).count();
            let mut text = format!("{} file{}", writes, if writes == 1 { "" } else { "s" });
            if skips > 0 {
                text.push_str(&format!(", {} placeholder{}", skips, if skips == 1 { "" } else { "s" }));
            }
            text
        }
        Mutation::None => "no changes".to_string(),
        Mutation::FullSync => "sync with reference".to_string(),
    }
}

/// Colored one-word rendering of a tool outcome
pub fn format_outcome(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Success => "ok".green().to_string(),
        ToolOutcome::NothingToCommit => "nothing to commit".yellow().to_string(),
        ToolOutcome::Failed { exit_code, .. } => format!("failed ({})", exit_code).red().to_string(),
    }
}
