//! Integration tests for the glimind binary.
//!
//! These tests verify end-to-end behavior including:
//! - Advisory output for classify
//! - Reading logging with insulin confirmation
//! - History, stats and CSV export over the reading log
//! - Input validation at the CLI boundary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("glimind"));
    // Keep the user's real config out of the tests
    cmd.arg("--config").arg(data_dir.join("config.toml"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn setup_with_config() -> TempDir {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("config.toml"), "").unwrap();
    temp_dir
}

fn read_log(data_dir: &Path) -> Vec<serde_json::Value> {
    let contents = fs::read_to_string(data_dir.join("readings.jsonl")).expect("Failed to read log");
    contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("glimind"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Glucose log and insulin advisory"));
}

#[test]
fn test_classify_json_scenarios() {
    let temp_dir = setup_with_config();
    let cases = [
        ("65", "2024-03-10T08:00", "danger", serde_json::Value::Null),
        ("100", "2024-03-10T12:30", "success", 1.into()),
        ("100", "2024-03-10T08:30", "success", 0.into()),
        ("200", "2024-03-10T13:00", "warning", 2.into()),
        ("300", "2024-03-10T09:00", "danger", 2.into()),
        ("300", "2024-03-10T12:00", "danger", 3.into()),
    ];

    for (glucose, at, severity, units) in cases {
        let output = cli(temp_dir.path())
            .args(["classify", "--glucose", glucose, "--at", at, "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let alert: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(alert["severity"], severity, "{} at {}", glucose, at);
        assert_eq!(alert["insulin_units"], units, "{} at {}", glucose, at);
    }
}

#[test]
fn test_classify_hypoglycemia_text() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["classify", "--glucose", "65", "--at", "2024-03-10T08:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Glicemia muito baixa!"))
        .stdout(predicate::str::contains("carboidrato"))
        .stdout(predicate::str::contains("Suggested insulin").not());
}

#[test]
fn test_classify_rejects_invalid_input() {
    let temp_dir = setup_with_config();
    for glucose in ["abc", "-10", "12.5", "5000"] {
        cli(temp_dir.path())
            .args(["classify", "--glucose", glucose, "--at", "2024-03-10T08:00"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Informe um valor válido"));
    }

    cli(temp_dir.path())
        .args(["classify", "--glucose", "100", "--at", "10/03/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Informe um valor válido"));
}

#[test]
fn test_meal_tag_timing_flag() {
    let temp_dir = setup_with_config();
    let output = cli(temp_dir.path())
        .args([
            "--timing",
            "meal-tag",
            "classify",
            "--glucose",
            "100",
            "--at",
            "2024-03-10T12:15",
            "--meal-type",
            "fasting",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let alert: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(alert["insulin_units"], 0);
}

#[test]
fn test_dosed_wording_flag() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "--wording",
            "dosed",
            "classify",
            "--glucose",
            "200",
            "--at",
            "2024-03-10T13:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aplique 2 unidades de insulina rápida."));
}

#[test]
fn test_log_accepts_suggestion() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "log",
            "--glucose",
            "300",
            "--at",
            "2024-03-10T12:00",
            "--meal-type",
            "pre_lunch",
            "--insulin-applied",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reading saved"));

    let log = read_log(temp_dir.path());
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["glucose_mg_dl"], 300);
    assert_eq!(log[0]["insulin_applied"], true);
    assert_eq!(log[0]["insulin_units"], 3);
    assert_eq!(log[0]["meal_type"], "pre_lunch");
}

#[test]
fn test_log_user_edits_units() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "log",
            "--glucose",
            "200",
            "--at",
            "2024-03-10T13:00",
            "--units",
            "4",
        ])
        .assert()
        .success();

    let log = read_log(temp_dir.path());
    assert_eq!(log[0]["insulin_units"], 4);
}

#[test]
fn test_log_interactive_prompt() {
    let temp_dir = setup_with_config();

    // Enter confirms the suggestion
    cli(temp_dir.path())
        .args(["log", "--glucose", "200", "--at", "2024-03-10T13:00"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested insulin: 2 units"));

    // A number records a different dose
    cli(temp_dir.path())
        .args(["log", "--glucose", "200", "--at", "2024-03-10T13:00"])
        .write_stdin("5\n")
        .assert()
        .success();

    // 'n' records that no insulin was applied
    cli(temp_dir.path())
        .args(["log", "--glucose", "200", "--at", "2024-03-10T13:00"])
        .write_stdin("n\n")
        .assert()
        .success();

    let log = read_log(temp_dir.path());
    assert_eq!(log.len(), 3);
    assert_eq!(log[0]["insulin_units"], 2);
    assert_eq!(log[1]["insulin_units"], 5);
    assert_eq!(log[2]["insulin_applied"], false);
    assert_eq!(log[2]["insulin_units"], serde_json::Value::Null);
}

#[test]
fn test_log_prompt_zero_suggestion_records_no_insulin() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["log", "--glucose", "100", "--at", "2024-03-10T08:00"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No insulin suggested"));

    let log = read_log(temp_dir.path());
    assert_eq!(log[0]["insulin_applied"], false);
    assert_eq!(log[0]["insulin_units"], serde_json::Value::Null);
}

#[test]
fn test_log_yes_never_records_suggested_insulin() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["log", "--glucose", "300", "--at", "2024-03-10T12:00", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested insulin: 3 units"));

    let log = read_log(temp_dir.path());
    assert_eq!(log[0]["insulin_applied"], false);
    assert_eq!(log[0]["insulin_units"], serde_json::Value::Null);
}

#[test]
fn test_log_hypoglycemia_with_yes_applies_nothing() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["log", "--glucose", "60", "--at", "2024-03-10T12:00", "--yes"])
        .assert()
        .success();

    let log = read_log(temp_dir.path());
    assert_eq!(log[0]["insulin_applied"], false);
    assert_eq!(log[0]["insulin_units"], serde_json::Value::Null);
}

#[test]
fn test_log_hypoglycemia_rejects_accepting_missing_suggestion() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "log",
            "--glucose",
            "60",
            "--at",
            "2024-03-10T12:00",
            "--insulin-applied",
        ])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("readings.jsonl").exists());
}

#[test]
fn test_log_dry_run_does_not_save() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "log",
            "--glucose",
            "150",
            "--at",
            "2024-03-10T08:00",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!temp_dir.path().join("readings.jsonl").exists());
}

#[test]
fn test_log_invalid_value_does_not_save() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["log", "--glucose", "muito", "--at", "2024-03-10T08:00", "--yes"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("readings.jsonl").exists());
}

#[test]
fn test_log_with_foods() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args([
            "log",
            "--glucose",
            "180",
            "--at",
            "2024-03-10T12:30",
            "--meal-type",
            "post_lunch",
            "--food",
            "Pão francês@Café da manhã!",
            "--food",
            "custom:Bolo de milho",
            "--notes",
            "Almoço de domingo",
            "--no-insulin",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("alto índice glicêmico"));

    let log = read_log(temp_dir.path());
    let foods = log[0]["food_items"].as_array().unwrap();
    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0]["high_glycemic"], true);
    assert_eq!(foods[1]["is_custom"], true);
    assert_eq!(foods[1]["category"], "Personalizado");
    assert_eq!(log[0]["notes"], "Almoço de domingo");
}

#[test]
fn test_history_and_stats() {
    let temp_dir = setup_with_config();

    for glucose in ["60", "120", "200"] {
        cli(temp_dir.path())
            .args(["log", "--glucose", glucose, "--no-insulin"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .args(["history", "--period", "24h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Glicemia muito baixa!"))
        .stdout(predicate::str::contains("Glicemia alta"));

    cli(temp_dir.path())
        .args(["stats", "--period", "7d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Readings:       3"))
        .stdout(predicate::str::contains("Average:        127 mg/dL"))
        .stdout(predicate::str::contains("Time for a new measurement").not());
}

#[test]
fn test_stats_empty_log_nudges_measurement() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Readings:       0"))
        .stdout(predicate::str::contains("Time for a new measurement"));
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_with_config();

    for glucose in ["90", "260"] {
        cli(temp_dir.path())
            .args(["log", "--glucose", glucose, "--no-insulin"])
            .assert()
            .success();
    }

    let out = temp_dir.path().join("report.csv");
    cli(temp_dir.path())
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 readings"));

    let csv_content = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(csv_content.starts_with("id,measured_at,glucose_mg_dl"));
    assert_eq!(csv_content.lines().count(), 3);
}

#[test]
fn test_export_empty_log_writes_header() {
    let temp_dir = setup_with_config();
    let out = temp_dir.path().join("empty.csv");
    cli(temp_dir.path())
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 0 readings"));

    let csv_content = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(csv_content.starts_with("id,measured_at,glucose_mg_dl"));
    assert_eq!(csv_content.lines().count(), 1);
}

#[test]
fn test_stats_critical_banner_for_latest_reading() {
    let temp_dir = setup_with_config();
    cli(temp_dir.path())
        .args(["log", "--glucose", "300", "--no-insulin"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("nível crítico: 300 mg/dL"));

    let calm_dir = setup_with_config();
    cli(calm_dir.path())
        .args(["log", "--glucose", "120", "--no-insulin"])
        .assert()
        .success();

    cli(calm_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("nível crítico").not());
}

#[test]
fn test_corrupt_log_lines_ignored() {
    let temp_dir = setup_with_config();
    fs::write(
        temp_dir.path().join("readings.jsonl"),
        "{ invalid json }\n{ more invalid }\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No readings"));
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[validation]\nmax_glucose_mg_dl = -1\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .args(["classify", "--glucose", "100", "--at", "2024-03-10T08:00"])
        .assert()
        .failure();
}
