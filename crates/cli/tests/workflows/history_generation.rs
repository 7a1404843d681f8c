//! Full runs of the generator against a real git binary

use crate::common::{files_at, git_available, git_log, test_adapter, TestProject};
use anyhow::Result;
use bd_core::{Plan, ProtectedSet};
use cli_lib::HistoryGenerator;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn three_step_plan(reference: &Path) -> Result<Plan> {
    Ok(Plan::builder()
        .reference(reference)
        .step("2026-02-01 18:15:00", "init")
        .write("a.txt", "1")
        .step("2026-02-01 20:45:00", "update")
        .write("a.txt", "2")
        .write("b.txt", "x")
        .sync("2026-02-01 19:00:00", "final")
        .build()?)
}

fn tree(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect()
}

#[test]
fn test_three_step_history() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    project.write_reference("c.txt", "y")?;
    let plan = three_step_plan(&project.reference())?;

    let mut generator = HistoryGenerator::new(project.root(), test_adapter(), ProtectedSet::builtin());
    let report = generator.run(&plan)?;

    assert!(report.is_clean(), "failures: {:?}", report.failures());
    assert_eq!(report.recorded_commits, Some(3));

    let log = git_log(&project.root())?;
    let subjects: Vec<_> = log.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["init", "update", "final"]);

    let dates: Vec<_> = log.iter().map(|c| c.author_date.as_str()).collect();
    assert_eq!(
        dates,
        vec!["2026-02-01 18:15:00", "2026-02-01 20:45:00", "2026-02-01 19:00:00"]
    );
    for commit in &log {
        assert_eq!(commit.author_date, commit.committer_date);
    }

    assert_eq!(files_at(&project.root(), &log[0].sha)?, tree(&[("a.txt", "1")]));
    assert_eq!(
        files_at(&project.root(), &log[1].sha)?,
        tree(&[("a.txt", "2"), ("b.txt", "x")])
    );
    assert_eq!(
        files_at(&project.root(), &log[2].sha)?,
        tree(&[("a.txt", "3"), ("b.txt", "x"), ("c.txt", "y")])
    );

    Ok(())
}

#[test]
fn test_empty_step_records_empty_commit() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "1")?;
    let plan = Plan::builder()
        .reference(project.reference())
        .step("2026-03-01 09:00:00", "first")
        .write("a.txt", "1")
        .step("2026-03-01 10:00:00", "chore: nothing")
        .sync("2026-03-01 11:00:00", "final")
        .build()?;

    let mut generator = HistoryGenerator::new(project.root(), test_adapter(), ProtectedSet::builtin());
    let report = generator.run(&plan)?;

    // Every step commits even when the tree did not move
    assert_eq!(report.benign_noops(), 0);
    assert_eq!(report.recorded_commits, Some(3));

    let log = git_log(&project.root())?;
    assert_eq!(log.len(), 3);
    assert_eq!(log[1].subject, "chore: nothing");
    assert_eq!(log[1].author_date, "2026-03-01 10:00:00");
    assert_eq!(
        files_at(&project.root(), &log[0].sha)?,
        files_at(&project.root(), &log[1].sha)?
    );

    Ok(())
}

#[test]
fn test_rerun_replaces_history() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    let plan = three_step_plan(&project.reference())?;

    HistoryGenerator::new(project.root(), test_adapter(), ProtectedSet::builtin()).run(&plan)?;
    fs::write(project.root().join("stray.txt"), "left behind")?;
    let report =
        HistoryGenerator::new(project.root(), test_adapter(), ProtectedSet::builtin()).run(&plan)?;

    assert_eq!(report.recorded_commits, Some(3));
    assert_eq!(report.wipe.removed, vec!["a.txt".to_string(), "b.txt".to_string(), "stray.txt".to_string()]);
    assert_eq!(git_log(&project.root())?.len(), 3);
    assert!(!project.root().join("stray.txt").exists());

    Ok(())
}

#[test]
fn test_protected_entries_survive_and_stay_untracked() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "1")?;
    fs::write(project.root().join("notes.md"), "keep me")?;
    fs::write(project.root().join("old.txt"), "remove me")?;

    let plan = Plan::builder()
        .reference(project.reference())
        .step("2026-01-01 12:00:00", "init")
        .write("a.txt", "1")
        .sync("2026-01-02 12:00:00", "final")
        .build()?;

    let mut protected = ProtectedSet::builtin();
    protected.insert("notes.md");
    HistoryGenerator::new(project.root(), test_adapter(), protected).run(&plan)?;

    assert_eq!(fs::read_to_string(project.root().join("notes.md"))?, "keep me");
    assert!(!project.root().join("old.txt").exists());

    // Protected names are kept on disk, not excluded from staging
    let log = git_log(&project.root())?;
    let last = files_at(&project.root(), &log[1].sha)?;
    assert_eq!(last.get("notes.md").map(String::as_str), Some("keep me"));
    assert!(!last.contains_key("old.txt"));

    Ok(())
}

#[test]
fn test_two_roots_get_identical_trees() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let first = TestProject::new()?;
    let second = TestProject::new()?;
    for project in [&first, &second] {
        project.write_reference("a.txt", "3")?;
        project.write_reference("nested/c.txt", "y")?;
    }

    let a = HistoryGenerator::new(first.root(), test_adapter(), ProtectedSet::builtin())
        .run(&three_step_plan(&first.reference())?)?;
    let b = HistoryGenerator::new(second.root(), test_adapter(), ProtectedSet::builtin())
        .run(&three_step_plan(&second.reference())?)?;

    let digests = |r: &cli_lib::RunReport| -> Vec<Option<String>> {
        r.steps.iter().map(|s| s.tree_digest.clone()).collect()
    };
    assert_eq!(digests(&a), digests(&b));

    let log_a = git_log(&first.root())?;
    let log_b = git_log(&second.root())?;
    for (x, y) in log_a.iter().zip(&log_b) {
        assert_eq!(x.subject, y.subject);
        assert_eq!(x.author_date, y.author_date);
        assert_eq!(files_at(&first.root(), &x.sha)?, files_at(&second.root(), &y.sha)?);
    }

    Ok(())
}
