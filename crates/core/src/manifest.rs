//! TOML plan files
//!
//! File content for a step can be written inline, pulled from a file next
//! to the plan, or marked as a placeholder that does nothing this step.
//! Everything is read up front, so a loaded [`Plan`] needs no further I/O.

use crate::error::PlanError;
use crate::path::RelPath;
use crate::plan::{sparse_from_pairs, Plan, PlanSettings};
use crate::step::{FileChange, Mutation, SnapshotStep};
use crate::timestamp::Timestamp;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    #[serde(default)]
    settings: SettingsFile,
    #[serde(default)]
    steps: Vec<StepFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    reference: Option<PathBuf>,
    #[serde(default)]
    protected: Vec<String>,
    #[serde(default)]
    scaffold_dirs: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepFile {
    timestamp: Timestamp,
    message: String,
    #[serde(default)]
    files: BTreeMap<String, FileEntry>,
    #[serde(default)]
    sync: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileEntry {
    Inline(String),
    From(FromEntry),
    Skip(SkipEntry),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FromEntry {
    from: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkipEntry {
    skip: bool,
}

/// Load and validate a plan file from disk
pub fn load_plan(path: &Path) -> Result<Plan, PlanError> {
    let text = fs::read_to_string(path).map_err(|source| PlanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    parse_plan(&text, base_dir, path)
}

/// Parse plan text; relative paths inside it resolve against `base_dir`
pub fn parse_plan(text: &str, base_dir: &Path, origin: &Path) -> Result<Plan, PlanError> {
    let file: PlanFile = toml::from_str(text).map_err(|source| PlanError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let settings = PlanSettings {
        reference: file.settings.reference.map(|p| base_dir.join(p)),
        protected: file.settings.protected,
        scaffold_dirs: file
            .settings
            .scaffold_dirs
            .iter()
            .map(|d| RelPath::new(d))
            .collect::<Result<_, _>>()?,
    };

    let mut steps = Vec::with_capacity(file.steps.len());
    for (index, raw) in file.steps.into_iter().enumerate() {
        let number = index + 1;
        let mutation = if raw.sync {
            if !raw.files.is_empty() {
                return Err(PlanError::InvalidStep {
                    step: number,
                    reason: "a sync step cannot also list files".to_string(),
                });
            }
            Mutation::FullSync
        } else if raw.files.is_empty() {
            Mutation::None
        } else {
            let mut pairs = Vec::with_capacity(raw.files.len());
            for (path, entry) in raw.files {
                let change = resolve_entry(number, &path, entry, base_dir)?;
                pairs.push((path, change));
            }
            sparse_from_pairs(number, pairs)?
        };
        steps.push(SnapshotStep::new(raw.timestamp, raw.message, mutation));
    }

    debug!(steps = steps.len(), origin = %origin.display(), "parsed plan");
    Plan::new(steps, settings)
}

fn resolve_entry(
    step: usize,
    path: &str,
    entry: FileEntry,
    base_dir: &Path,
) -> Result<FileChange, PlanError> {
    match entry {
        FileEntry::Inline(content) => Ok(FileChange::Write(content.into_bytes())),
        FileEntry::From(FromEntry { from }) => {
            let source = base_dir.join(from);
            let bytes = fs::read(&source).map_err(|source_err| PlanError::Read {
                path: source.clone(),
                source: source_err,
            })?;
            Ok(FileChange::Write(bytes))
        }
        FileEntry::Skip(SkipEntry { skip: true }) => Ok(FileChange::Skip),
        FileEntry::Skip(SkipEntry { skip: false }) => Err(PlanError::InvalidStep {
            step,
            reason: format!("'{path}' has skip = false; give it content or drop it"),
        }),
    }
}

/// Example plan printed by `backdate example`
pub const EXAMPLE_PLAN: &str = r#"# backdate plan file
#
# Steps run top to bottom. Each one becomes exactly one commit whose
# author and committer dates are the step's timestamp.

[settings]
# Final state of the project. Relative to this file.
reference = "../final-site"
# Extra top-level names that are never wiped or overwritten.
protected = []
# Created empty right after `git init`.
scaffold_dirs = ["css", "js", "images"]

[[steps]]
timestamp = "2026-02-01 18:15:00"
message = "Initial commit: Setup project scaffold and HTML5 boilerplate"
[steps.files]
"index.html" = """
<!DOCTYPE html>
<html lang="en">
<head><title>Portfolio</title></head>
<body></body>
</html>
"""
"css/style.css" = "/* Portfolio Styles */\n"
"js/main.js" = "// Portfolio JavaScript\n"

[[steps]]
timestamp = "2026-02-01 20:45:00"
message = "Style: Define CSS root variables and reset"
[steps.files]
"css/style.css" = ":root {\n    --bg-base: #A4550A;\n}\n"
# Placeholder: nothing changes for this path in this step.
"js/main.js" = { skip = true }

[[steps]]
timestamp = "2026-02-02 01:45:00"
message = "Chore: Review layout"

[[steps]]
timestamp = "2026-02-02 18:20:00"
message = "Final: Match the finished site"
sync = true
"#;
