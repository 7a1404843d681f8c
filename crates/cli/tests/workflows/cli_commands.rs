//! The `backdate` binary end to end

use crate::backdate;
use crate::common::{files_at, git_available, git_log, TestProject};
use anyhow::Result;
use std::fs;

const PLAN: &str = r#"
[settings]
reference = "../final"

[[steps]]
timestamp = "2026-02-01 18:15:00"
message = "init"
[steps.files]
"a.txt" = "1"

[[steps]]
timestamp = "2026-02-01 20:45:00"
message = "update"
[steps.files]
"a.txt" = "2"
"b.txt" = "x"
"c.txt" = { skip = true }

[[steps]]
timestamp = "2026-02-01 19:00:00"
message = "final"
sync = true
"#;

#[test]
fn test_example_prints_a_valid_plan() -> Result<()> {
    let project = TestProject::new()?;
    let result = backdate!(project.root(), "example").assert_success()?;

    assert!(result.contains_stdout("[[steps]]"));
    assert!(result.contains_stdout("sync = true"));

    // The printed plan loads as-is
    let path = project.write_plan(&result.stdout)?;
    backdate!(project.root(), "check", "--plan", path.to_str().unwrap()).assert_success()?;
    Ok(())
}

#[test]
fn test_check_flags_out_of_order_steps() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.write_plan(PLAN)?;

    let result = backdate!(project.root(), "check", "--plan", path.to_str().unwrap()).assert_success()?;
    assert!(result.contains_stdout("init"));
    assert!(result.contains_stdout("1 step(s) are dated earlier"));
    assert!(result.contains_stdout("3 steps, 3 commits"));
    Ok(())
}

#[test]
fn test_check_rejects_invalid_plan() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.write_plan(
        r#"
[[steps]]
timestamp = "2026-02-01 18:15:00"
message = "only step"
[steps.files]
"a.txt" = "1"
"#,
    )?;

    let result = backdate!(project.root(), "check", "--plan", path.to_str().unwrap()).assert_failure()?;
    assert!(result.contains_stderr("Failed to load plan"));
    Ok(())
}

#[test]
fn test_run_refuses_foreign_root_without_yes() -> Result<()> {
    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    let path = project.write_plan(PLAN)?;
    fs::write(project.root().join("precious.txt"), "do not delete")?;

    let result = backdate!(project.root(), "run", "--plan", path.to_str().unwrap()).assert_failure()?;
    assert!(result.contains_stderr("Refusing to wipe"));
    assert!(result.contains_stderr("precious.txt"));
    assert!(project.root().join("precious.txt").exists());
    assert!(!project.root().join(".git").exists());
    Ok(())
}

#[test]
fn test_run_json_report() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    project.write_reference("c.txt", "y")?;
    let path = project.write_plan(PLAN)?;

    let result = backdate!(
        project.root(),
        "run",
        "--plan",
        path.to_str().unwrap(),
        "--author-name",
        "Test Author",
        "--author-email",
        "author@example.com",
        "--json",
        "--strict"
    )
    .assert_success()?;

    let report: serde_json::Value = serde_json::from_str(&result.stdout)?;
    assert_eq!(report["intended_commits"], 3);
    assert_eq!(report["recorded_commits"], 3);
    assert_eq!(report["steps"][0]["commit"]["status"], "success");
    assert_eq!(report["steps"][2]["mutation"]["kind"], "full_sync");

    let log = git_log(&project.root())?;
    assert_eq!(log.len(), 3);
    assert_eq!(log[2].author_date, "2026-02-01 19:00:00");

    // The plan file is protected but still lives in the tree, so it is staged
    let last = files_at(&project.root(), &log[2].sha)?;
    assert!(last.contains_key("history.toml"));
    assert_eq!(last.get("a.txt").map(String::as_str), Some("3"));
    assert_eq!(last.get("b.txt").map(String::as_str), Some("x"));
    assert_eq!(last.get("c.txt").map(String::as_str), Some("y"));
    Ok(())
}

#[test]
fn test_run_human_summary() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    let path = project.write_plan(PLAN)?;

    let result = backdate!(
        project.root(),
        "run",
        "--plan",
        path.to_str().unwrap(),
        "--author-name",
        "Test Author",
        "--author-email",
        "author@example.com"
    )
    .assert_success()?;

    assert!(result.contains_stdout("[1/3]"));
    assert!(result.contains_stdout("[3/3]"));
    assert!(result.contains_stdout("Date: 2026-02-01 19:00:00"));
    assert!(result.contains_stdout("Git history generation complete!"));
    assert!(result.contains_stdout("git log --oneline"));
    Ok(())
}

#[test]
fn test_log_file_in_root_survives_wipe() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let project = TestProject::new()?;
    project.write_reference("a.txt", "3")?;
    let path = project.write_plan(PLAN)?;
    let root = project.root();

    // Relative log path from the parent directory, absolute root
    let result = backdate!(
        project.base(),
        "-v",
        "--log-file",
        "site/run.log",
        "run",
        "--plan",
        path.to_str().unwrap(),
        "--root",
        root.to_str().unwrap(),
        "--author-name",
        "Test Author",
        "--author-email",
        "author@example.com"
    )
    .assert_success()?;
    assert!(!result.contains_stderr("Refusing to wipe"));

    let log = fs::read_to_string(root.join("run.log"))?;
    assert!(log.contains("Initializing new git repository"));
    assert!(!log.contains("Removed: run.log"));
    Ok(())
}

#[test]
fn test_run_missing_reference_leaves_root_untouched() -> Result<()> {
    let project = TestProject::new()?;
    fs::remove_dir_all(project.reference())?;
    let path = project.write_plan(PLAN)?;

    let result = backdate!(project.root(), "run", "--plan", path.to_str().unwrap(), "--yes").assert_failure()?;
    assert!(result.contains_stderr("source directory not found"));

    let entries: Vec<_> = fs::read_dir(project.root())?
        .map(|e| e.map(|e| e.file_name()))
        .collect::<Result<_, _>>()?;
    assert_eq!(entries, vec![std::ffi::OsString::from("history.toml")]);
    Ok(())
}
