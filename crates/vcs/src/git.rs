//! Git driven through its command line
//!
//! Dates reach git through `GIT_AUTHOR_DATE` / `GIT_COMMITTER_DATE` on the
//! child process only. The repository root is passed as the child's working
//! directory on every call, so the caller's own cwd is never consulted.

use crate::error::VcsError;
use crate::outcome::ToolOutcome;
use crate::process::{ProcessOutput, ProcessRequest, ProcessRunner, SystemRunner};
use crate::{CommitRequest, VersionControl};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name and email recorded as both author and committer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

pub struct GitAdapter<R: ProcessRunner = SystemRunner> {
    runner: R,
    program: String,
    identity: Option<Identity>,
    config: Vec<(String, String)>,
}

impl GitAdapter<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for GitAdapter<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> GitAdapter<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            program: "git".to_string(),
            identity: None,
            config: Vec::new(),
        }
    }

    /// Use a different git executable
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Pass `-c key=value` ahead of every subcommand
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn run(&self, root: &Path, args: &[&str], env: Vec<(String, String)>) -> Result<ProcessOutput, VcsError> {
        let mut argv = Vec::with_capacity(self.config.len() * 2 + args.len());
        for (key, value) in &self.config {
            argv.push("-c".to_string());
            argv.push(format!("{key}={value}"));
        }
        argv.extend(args.iter().map(|a| a.to_string()));

        debug!(program = %self.program, args = ?argv, cwd = %root.display(), "running");
        self.runner.run(&ProcessRequest {
            program: self.program.clone(),
            args: argv,
            cwd: root.to_path_buf(),
            env,
        })
    }

    fn identity_env(&self) -> Vec<(String, String)> {
        match &self.identity {
            Some(id) => vec![
                ("GIT_AUTHOR_NAME".to_string(), id.name.clone()),
                ("GIT_AUTHOR_EMAIL".to_string(), id.email.clone()),
                ("GIT_COMMITTER_NAME".to_string(), id.name.clone()),
                ("GIT_COMMITTER_EMAIL".to_string(), id.email.clone()),
            ],
            None => Vec::new(),
        }
    }
}

impl<R: ProcessRunner> VersionControl for GitAdapter<R> {
    fn initialize(&self, root: &Path) -> Result<ToolOutcome, VcsError> {
        let git_dir = root.join(".git");
        if fs::symlink_metadata(&git_dir).is_ok() {
            info!("Removing existing .git directory");
            let removal = if git_dir.is_dir() {
                fs::remove_dir_all(&git_dir)
            } else {
                fs::remove_file(&git_dir)
            };
            removal.map_err(|source| VcsError::ResetMetadata {
                path: git_dir.clone(),
                source,
            })?;
        }

        let output = self.run(root, &["init"], Vec::new())?;
        Ok(report("init", classify(&output)))
    }

    fn stage_all(&self, root: &Path) -> Result<ToolOutcome, VcsError> {
        let output = self.run(root, &["add", "-A"], Vec::new())?;
        Ok(report("add", classify(&output)))
    }

    fn commit(&self, root: &Path, request: &CommitRequest) -> Result<ToolOutcome, VcsError> {
        let date = request.timestamp.to_git_date();
        let mut env = self.identity_env();
        env.push(("GIT_AUTHOR_DATE".to_string(), date.clone()));
        env.push(("GIT_COMMITTER_DATE".to_string(), date));

        let mut args = vec!["commit"];
        if request.allow_empty {
            args.push("--allow-empty");
        }
        args.extend(["-m", request.message.as_str()]);

        let output = self.run(root, &args, env)?;
        Ok(report("commit", classify(&output)))
    }

    fn commit_count(&self, root: &Path) -> Result<Option<usize>, VcsError> {
        let output = self.run(root, &["rev-list", "--count", "HEAD"], Vec::new())?;
        if output.success() {
            return Ok(output.stdout.trim().parse().ok());
        }
        // A repository without commits has no HEAD to count from
        let stderr = output.stderr.to_lowercase();
        if stderr.contains("unknown revision") || stderr.contains("ambiguous argument 'head'") {
            return Ok(Some(0));
        }
        warn!("Could not count commits: {}", output.stderr.trim());
        Ok(None)
    }
}

/// Map an exit status to an outcome, recognizing git's "nothing to commit"
pub fn classify(output: &ProcessOutput) -> ToolOutcome {
    if output.success() {
        return ToolOutcome::Success;
    }

    let nothing = "nothing to commit";
    if output.stdout.to_lowercase().contains(nothing) || output.stderr.to_lowercase().contains(nothing) {
        return ToolOutcome::NothingToCommit;
    }

    let detail = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    ToolOutcome::Failed {
        exit_code: output.exit_code,
        stderr: detail.to_string(),
    }
}

fn report(operation: &str, outcome: ToolOutcome) -> ToolOutcome {
    match &outcome {
        ToolOutcome::Success => debug!("git {} succeeded", operation),
        ToolOutcome::NothingToCommit => debug!("git {}: nothing to commit", operation),
        ToolOutcome::Failed { exit_code, stderr } => {
            warn!("Git error ({} exited {}): {}", operation, exit_code, stderr)
        }
    }
    outcome
}
