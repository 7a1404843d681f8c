//! Backdate CLI - backdate command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vcs::Identity;

mod cmd;
mod util;

/// Backdate - Replay a planned, dated commit history onto a project
#[derive(Parser)]
#[command(name = "backdate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wipe the working tree and replay every step of a plan as a dated commit
    Run {
        /// Plan file (TOML)
        #[arg(long)]
        plan: PathBuf,

        /// Working tree to build (default: the plan file's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Reference tree for the final sync (overrides the plan)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Author and committer name
        #[arg(long, requires = "author_email")]
        author_name: Option<String>,

        /// Author and committer email
        #[arg(long, requires = "author_name")]
        author_email: Option<String>,

        /// Git executable to use
        #[arg(long)]
        git: Option<String>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Exit non-zero if any git invocation failed
        #[arg(long)]
        strict: bool,

        /// Skip the safety check on a non-empty, non-repository root
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Load and validate a plan, then list its steps
    Check {
        /// Plan file (TOML)
        #[arg(long)]
        plan: PathBuf,
    },
    /// Print an example plan file
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = cli_lib::logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            plan,
            root,
            reference,
            author_name,
            author_email,
            git,
            json,
            strict,
            yes,
        } => {
            let identity = match (author_name, author_email) {
                (Some(name), Some(email)) => Some(Identity::new(name, email)),
                _ => None,
            };
            cmd::run::run(cmd::run::RunArgs {
                plan,
                root,
                reference,
                identity,
                git,
                log_file: cli.log_file,
                json,
                strict,
                yes,
            })
        }
        Commands::Check { plan } => cmd::check::run(&plan),
        Commands::Example => cmd::example::run(),
    }
}
