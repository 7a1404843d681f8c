//! Test projects and git inspection helpers

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use vcs::{GitAdapter, Identity};

/// Whether a usable `git` is on PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Adapter with a fixed identity and signing disabled
pub fn test_adapter() -> GitAdapter {
    GitAdapter::new()
        .identity(Identity::new("Test Author", "author@example.com"))
        .config("commit.gpgsign", "false")
}

/// A temp directory holding a working tree (`site/`) and a reference tree (`final/`)
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp dir")?;
        fs::create_dir_all(dir.path().join("site"))?;
        fs::create_dir_all(dir.path().join("final"))?;
        Ok(Self { dir })
    }

    /// Directory holding both `site/` and `final/`
    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("site")
    }

    pub fn reference(&self) -> PathBuf {
        self.dir.path().join("final")
    }

    pub fn write_reference(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.reference().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Write `history.toml` into the working tree root
    pub fn write_plan(&self, text: &str) -> Result<PathBuf> {
        let path = self.root().join("history.toml");
        fs::write(&path, text)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub author_date: String,
    pub committer_date: String,
    pub subject: String,
}

fn git(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .context("Failed to run git")?;
    if !output.status.success() {
        anyhow::bail!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Commits oldest first, dates in the commit's own recorded zone
pub fn git_log(root: &Path) -> Result<Vec<CommitInfo>> {
    let out = git(
        root,
        &[
            "log",
            "--reverse",
            "--format=%H%x1f%ad%x1f%cd%x1f%s",
            "--date=format:%Y-%m-%d %H:%M:%S",
        ],
    )?;

    out.lines()
        .filter(|l| !l.is_empty())
        .map(|line| {
            let parts: Vec<_> = line.split('\u{1f}').collect();
            if parts.len() != 4 {
                anyhow::bail!("Unexpected log line: {}", line);
            }
            Ok(CommitInfo {
                sha: parts[0].to_string(),
                author_date: parts[1].to_string(),
                committer_date: parts[2].to_string(),
                subject: parts[3].to_string(),
            })
        })
        .collect()
}

/// Every file in a commit's tree with its content
pub fn files_at(root: &Path, sha: &str) -> Result<BTreeMap<String, String>> {
    let listing = git(root, &["ls-tree", "-r", "--name-only", sha])?;
    let mut files = BTreeMap::new();
    for path in listing.lines().filter(|l| !l.is_empty()) {
        let content = git(root, &["show", &format!("{}:{}", sha, path)])?;
        files.insert(path.to_string(), content);
    }
    Ok(files)
}
