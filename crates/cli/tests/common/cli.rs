//! Drive the `backdate` binary from tests
//!
//! Every invocation gets `commit.gpgsign=false` through git's
//! environment config so a signing setup on the host cannot block commits.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct BackdateCommand {
    cwd: PathBuf,
    args: Vec<String>,
}

impl BackdateCommand {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn output(&self) -> Result<Outcome> {
        let output = Command::new(env!("CARGO_BIN_EXE_backdate"))
            .args(&self.args)
            .current_dir(&self.cwd)
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "commit.gpgsign")
            .env("GIT_CONFIG_VALUE_0", "false")
            .env_remove("RUST_LOG")
            .output()
            .with_context(|| format!("Failed to spawn backdate {:?}", self.args))?;

        Ok(Outcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run and require exit status zero
    pub fn assert_success(&self) -> Result<Outcome> {
        let outcome = self.output()?;
        anyhow::ensure!(
            outcome.code == Some(0),
            "backdate {:?} exited {:?}\n--- stdout\n{}\n--- stderr\n{}",
            self.args,
            outcome.code,
            outcome.stdout,
            outcome.stderr
        );
        Ok(outcome)
    }

    /// Run and require a non-zero exit
    pub fn assert_failure(&self) -> Result<Outcome> {
        let outcome = self.output()?;
        anyhow::ensure!(
            outcome.code != Some(0),
            "backdate {:?} unexpectedly succeeded\n--- stdout\n{}",
            self.args,
            outcome.stdout
        );
        Ok(outcome)
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Outcome {
    pub fn contains_stdout(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    pub fn contains_stderr(&self, needle: &str) -> bool {
        self.stderr.contains(needle)
    }
}

/// `backdate!(dir, "check", "--plan", path)` builds a [`BackdateCommand`]
#[macro_export]
macro_rules! backdate {
    ($dir:expr, $($arg:expr),+ $(,)?) => {{
        let mut cmd = $crate::common::cli::BackdateCommand::new($dir);
        cmd.args(&[$($arg),+]);
        cmd
    }};
}
