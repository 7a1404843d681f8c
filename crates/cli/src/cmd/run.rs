//! Generate the history described by a plan

use crate::util;
use anyhow::{Context, Result};
use bd_core::{load_plan, ProtectedSet};
use cli_lib::{HistoryGenerator, Progress, RunReport};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use vcs::{GitAdapter, Identity};

pub struct RunArgs {
    pub plan: PathBuf,
    pub root: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub identity: Option<Identity>,
    pub git: Option<String>,
    pub log_file: Option<PathBuf>,
    pub json: bool,
    pub strict: bool,
    pub yes: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut plan = load_plan(&args.plan)
        .with_context(|| format!("Failed to load plan {}", args.plan.display()))?;
    if let Some(reference) = args.reference {
        plan = plan.with_reference(reference);
    }

    let root = args.root.unwrap_or_else(|| util::plan_dir(&args.plan));

    let mut protected = ProtectedSet::for_run(
        &root,
        Some(&args.plan),
        plan.settings().protected.iter().cloned(),
    );
    if let Some(log_file) = &args.log_file {
        protected.insert_if_under(&root, log_file);
    }

    if !args.yes {
        util::ensure_safe_root(&root, &protected)?;
    }

    let mut git = GitAdapter::new();
    if let Some(program) = args.git {
        git = git.program(program);
    }
    if let Some(identity) = args.identity {
        git = git.identity(identity);
    }

    if !args.json {
        println!("{}", "Backdate History Generator".bold());
        println!("{}: {}", "Repository".dimmed(), root.display());
        println!();
    }

    let bar = if args.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(plan.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .context("Invalid progress template")?,
        );
        bar
    };

    // `ProgressBar::println` drops lines when stdout is not a terminal
    let json = args.json;
    let say = |line: String| {
        if !json {
            bar.suspend(|| println!("{}", line));
        }
    };

    let mut generator = HistoryGenerator::new(&root, git, protected);
    let report = generator
        .run_with(&plan, |event| match event {
            Progress::Wiped(wipe) => {
                say(format!(
                    "Cleared project folder ({} removed)",
                    wipe.removed.len()
                ));
                for fault in &wipe.faults {
                    say(format!("  {} {}: {}", "!".red(), fault.name, fault.error));
                }
            }
            Progress::StepStarted { index, total, step } => {
                say(format!("\n[{}/{}] {}", index, total, step.message.bold()));
                say(format!("       Date: {}", step.timestamp));
                say(format!("       {}", util::describe_mutation(step).dimmed()));
                bar.set_message(step.message.clone());
            }
            Progress::StepFinished(step) => {
                if !step.commit.is_success() {
                    say(format!("       commit: {}", util::format_outcome(&step.commit)));
                }
                for fault in step.entry_faults() {
                    say(format!("  {} {}: {}", "!".red(), fault.name, fault.error));
                }
                bar.inc(1);
            }
        })
        .context("History generation failed")?;
    bar.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    let failures = report.failures();
    if args.strict && (!failures.is_empty() || report.entry_faults() > 0) {
        anyhow::bail!(
            "{} tool failure(s) and {} entry fault(s) recorded",
            failures.len(),
            report.entry_faults()
        );
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "━".repeat(60));
    println!("{}", "Git history generation complete!".green().bold());
    println!("{}", "━".repeat(60));
    println!();
    println!("Total commits: {}", report.intended_commits);
    match report.recorded_commits {
        Some(n) if n == report.intended_commits => {
            println!("Recorded:      {}", n.to_string().green())
        }
        Some(n) => println!("Recorded:      {}", n.to_string().red()),
        None => println!("Recorded:      {}", "unknown".yellow()),
    }
    if report.benign_noops() > 0 {
        println!("Nothing to commit: {}", report.benign_noops().to_string().yellow());
    }

    let failures = report.failures();
    if !failures.is_empty() {
        println!();
        println!("{}", "Tool failures:".red().bold());
        for failure in &failures {
            let at = match failure.step {
                Some(step) => format!("step {}", step),
                None => "setup".to_string(),
            };
            println!("  {} git {} (exit {}): {}", at, failure.operation, failure.exit_code, failure.detail);
        }
    }
    if report.entry_faults() > 0 {
        println!("Entry faults: {}", report.entry_faults().to_string().red());
    }

    println!();
    println!("Repository: {}", report.root.display());
    println!("The project now matches: {}", report.reference.display());
    println!();
    println!("Run 'git log --oneline' to verify the history.");
}
