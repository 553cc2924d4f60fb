//! End-to-end tests for the `wedbudget` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wedbudget(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wedbudget").unwrap();
    cmd.env("WEDDING_BUDGET_DATA_DIR", data_dir.path())
        .env_remove("WEDDING_BUDGET_SESSION")
        .env_remove("RUST_LOG");
    cmd
}

fn plan(data_dir: &TempDir) {
    wedbudget(data_dir)
        .args([
            "plan",
            "40000",
            "100",
            "--city",
            "Austin",
            "--country",
            "United States",
            "--date",
            "2026-10-10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total budget of $40000.00 for 100 guests"))
        .stdout(predicate::str::contains("Catering"));
}

#[test]
fn test_no_command_prints_usage_hint() {
    let dir = TempDir::new().unwrap();
    wedbudget(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("wedbudget --help"));
}

#[test]
fn test_show_without_plan_fails() {
    let dir = TempDir::new().unwrap();
    wedbudget(&dir)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session not found"));
}

#[test]
fn test_plan_then_remove_and_merge() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args(["remove", "favors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed Favors"))
        .stdout(predicate::str::contains("100.00%"));

    wedbudget(&dir)
        .args(["merge", "stationery", "flowers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged stationery into Flowers"));

    wedbudget(&dir)
        .args(["show", "--category", "favors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category not found: favors"));

    wedbudget(&dir)
        .args(["merge", "venue", "venue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("into itself"));
}

#[test]
fn test_plan_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args([
            "plan", "20000", "50", "--city", "Austin", "--country", "United States", "--date",
            "2026-10-10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_invalid_date_is_rejected() {
    let dir = TempDir::new().unwrap();
    wedbudget(&dir)
        .args([
            "plan", "40000", "100", "--city", "Austin", "--country", "United States", "--date",
            "next spring",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_add_prefs_and_actual() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args(["add", "Hair & Makeup", "--percent", "3", "--priority", "low"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Hair & Makeup (hair-makeup) at 3.00%"));

    wedbudget(&dir)
        .args(["prefs", "--transportation", "Limo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preference: Transportation"));

    wedbudget(&dir)
        .args(["actual", "venue", "2500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spent $2500.00"));
}

#[test]
fn test_apply_patches_from_file() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    let reply = dir.path().join("reply.json");
    std::fs::write(
        &reply,
        r#"{"reply": "Shifted money to photography.",
            "patches": [
              {"id": "photography", "percentage": 14.0},
              {"id": "parking", "estimatedCost": 50000}
            ]}"#,
    )
    .unwrap();

    wedbudget(&dir)
        .arg("apply-patches")
        .arg(&reply)
        .assert()
        .success()
        .stdout(predicate::str::contains("Assistant: Shifted money to photography."))
        .stdout(predicate::str::contains("Applied 1 update(s), dropped 1."))
        .stdout(predicate::str::contains("unknown category 'parking'"));
}

#[test]
fn test_export_formats() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args(["export", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"schemaVersion\": \"1.0.0\""));

    wedbudget(&dir)
        .args(["export", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,Name,Percentage"));

    let out = dir.path().join("budget.yaml");
    wedbudget(&dir)
        .arg("export")
        .arg(&out)
        .args(["--format", "yaml"])
        .assert()
        .success();
    let yaml = std::fs::read_to_string(&out).unwrap();
    assert!(yaml.starts_with("# Wedding Budget Export"));
}

#[test]
fn test_history_lists_audit_entries() {
    let dir = TempDir::new().unwrap();
    plan(&dir);
    wedbudget(&dir).args(["remove", "favors"]).assert().success();

    wedbudget(&dir)
        .args(["history", "-n", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DELETE Category favors"));
}

#[test]
fn test_sessions_are_independent() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args(["--session", "other", "show"])
        .assert()
        .failure();

    wedbudget(&dir)
        .args(["total", "50000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total budget of $50000.00"));
}

#[test]
fn test_total_rejects_oversized_amounts() {
    let dir = TempDir::new().unwrap();
    plan(&dir);

    wedbudget(&dir)
        .args(["total", "99999999999999999"])
        .assert()
        .failure();
    wedbudget(&dir)
        .args(["total", "1000000001"])
        .assert()
        .failure();

    wedbudget(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total budget of $40000.00"));
}
