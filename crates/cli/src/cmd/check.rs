//! Validate a plan without touching anything

use crate::util;
use anyhow::{Context, Result};
use bd_core::load_plan;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(plan_path: &Path) -> Result<()> {
    let plan = load_plan(plan_path)
        .with_context(|| format!("Failed to load plan {}", plan_path.display()))?;

    println!("{} {}", "Plan".bold(), plan_path.display());
    println!();

    let late = plan.non_monotonic_steps();
    let width = plan.len().to_string().len();
    for (offset, step) in plan.steps().iter().enumerate() {
        let index = offset + 1;
        let marker = if late.contains(&offset) {
            "↺".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{:>width$} {} {} {}  {}",
            index,
            marker,
            step.timestamp.to_string().cyan(),
            step.message,
            format!("({})", util::describe_mutation(step)).dimmed(),
            width = width
        );
    }

    println!();
    if !late.is_empty() {
        println!(
            "{} {} step(s) are dated earlier than the step before them (marked ↺). \
             They are kept in plan order.",
            "note:".yellow(),
            late.len()
        );
    }

    match &plan.settings().reference {
        Some(reference) if reference.is_dir() => {
            println!("{} {}", "Reference:".dimmed(), reference.display())
        }
        Some(reference) => println!(
            "{} reference tree {} does not exist yet; `run` will refuse to start",
            "warning:".red(),
            reference.display()
        ),
        None => println!(
            "{} no reference tree configured; pass --reference to `run`",
            "warning:".yellow()
        ),
    }

    println!("{} {} steps, {} commits", "OK".green(), plan.len(), plan.len());
    Ok(())
}
