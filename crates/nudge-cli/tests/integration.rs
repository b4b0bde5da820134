#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const SHEET: &str = "Feature selection export,,,\n\
                     sample,b0001,b0002,score\n\
                     s1,0.02,0.5,0.995\n\
                     s2,0.4,0.6,0.3\n";

fn nudge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nudge").unwrap();
    cmd.current_dir(dir.path()).env("NUDGE_ROOT", dir.path());
    cmd
}

fn write_sheet(dir: &TempDir, name: &str, data: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn history_json(dir: &TempDir, limit: usize) -> Vec<serde_json::Value> {
    let out = nudge(dir)
        .args(["history", "--json", "--limit", &limit.to_string()])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// nudge init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_database() {
    let dir = TempDir::new().unwrap();
    nudge(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized nudge"));

    assert!(dir.path().join(".nudge/config.yaml").exists());
    assert!(dir.path().join(".nudge/adjustments.db").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    nudge(&dir).arg("init").assert().success();
    nudge(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

// ---------------------------------------------------------------------------
// nudge columns
// ---------------------------------------------------------------------------

#[test]
fn columns_marks_renamable_features() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    nudge(&dir)
        .args(["columns", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Identifier: sample"))
        .stdout(predicate::str::contains("b0001  (renamable)"))
        .stdout(predicate::str::contains("score\n"));
}

#[test]
fn columns_json_lists_features() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let out = nudge(&dir)
        .args(["--json", "columns", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["identifier"], "sample");
    assert_eq!(v["features"], serde_json::json!(["b0001", "b0002", "score"]));
    assert_eq!(v["renamable"], serde_json::json!(["b0001", "b0002"]));
    assert_eq!(v["rows"], 2);
}

// ---------------------------------------------------------------------------
// nudge apply
// ---------------------------------------------------------------------------

#[test]
fn forced_delta_clamps_and_exports() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let out = dir.path().join("adjusted.csv");

    nudge(&dir)
        .args(["apply", file.to_str().unwrap()])
        .args(["--select", "b0001", "--magnitude", "0.1", "--sign", "-"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Adjustment applied: -0.1"));

    let exported = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        exported,
        "sample,b0001,b0002,score\ns1,0,0.5,0.995\ns2,0.3,0.6,0.3\n"
    );

    let history = history_json(&dir, 10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["magnitude"], 0.1);
    assert_eq!(history[0]["sign"], "-");
}

#[test]
fn xlsx_export_reads_back_as_input() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let xlsx = dir.path().join("adjusted.xlsx");
    let csv = dir.path().join("adjusted.csv");

    nudge(&dir)
        .args(["apply", file.to_str().unwrap()])
        .args(["--select", "b0001", "--magnitude", "0.1", "--sign", "-"])
        .args(["--out", xlsx.to_str().unwrap(), "--out", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("adjusted.xlsx"))
        .stdout(predicate::str::contains("adjusted.csv"));

    assert!(std::fs::read(&xlsx).unwrap().starts_with(b"PK"));
    assert_eq!(
        std::fs::read_to_string(&csv).unwrap(),
        "sample,b0001,b0002,score\ns1,0,0.5,0.995\ns2,0.3,0.6,0.3\n"
    );

    let out = nudge(&dir)
        .args(["--json", "columns", xlsx.to_str().unwrap(), "--no-banner"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["identifier"], "sample");
    assert_eq!(v["features"], serde_json::json!(["b0001", "b0002", "score"]));
    assert_eq!(v["rows"], 2);

    let again = dir.path().join("again.csv");
    nudge(&dir)
        .args(["apply", xlsx.to_str().unwrap(), "--no-banner"])
        .args(["--select", "b0002", "--magnitude", "0.05", "--sign", "+"])
        .args(["--out", again.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(&again).unwrap(),
        "sample,b0001,b0002,score\ns1,0,0.55,0.995\ns2,0.3,0.65,0.3\n"
    );
    assert_eq!(history_json(&dir, 10).len(), 2);
}

#[test]
fn default_selection_adjusts_every_feature() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let out = nudge(&dir)
        .args(["--json", "apply", file.to_str().unwrap()])
        .args(["--magnitude", "0.01", "--sign", "+"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["selected"], serde_json::json!(["b0001", "b0002", "score"]));
    assert_eq!(v["event"]["sign"], "+");
    let rows = v["table"]["rows"].as_array().unwrap();
    assert_eq!(rows[0]["label"], "s1");
    assert_eq!(rows[0]["values"], serde_json::json!([0.03, 0.51, 1.0]));
}

#[test]
fn table_without_features_is_rejected_and_not_logged() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "ids.csv", "banner\nsample\ns1\ns2\n");
    nudge(&dir)
        .args(["apply", file.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("select at least one feature"));

    assert!(history_json(&dir, 10).is_empty());
}

#[test]
fn selecting_identifier_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    nudge(&dir)
        .args(["apply", file.to_str().unwrap(), "--select", "sample"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be adjusted"));
}

#[test]
fn unknown_column_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    nudge(&dir)
        .args(["apply", file.to_str().unwrap(), "--select", "b9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column: b9999"));
}

#[test]
fn renamed_column_can_be_selected() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let out = dir.path().join("adjusted.csv");
    nudge(&dir)
        .args(["apply", file.to_str().unwrap()])
        .args(["--rename", "b0002=gc_content", "--select", "gc_content"])
        .args(["--magnitude", "0.05", "--sign", "+"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed: b0002 -> gc_content"));

    let exported = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        exported,
        "sample,b0001,gc_content,score\ns1,0.02,0.55,0.995\ns2,0.4,0.65,0.3\n"
    );
}

#[test]
fn renaming_unprefixed_column_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    nudge(&dir)
        .args(["apply", file.to_str().unwrap(), "--rename", "score=quality"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be renamed"));
    assert!(history_json(&dir, 10).is_empty());
}

#[test]
fn non_numeric_cell_fails_before_logging() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "bad.csv", "banner\nid,f1\nr1,n/a\n");
    nudge(&dir)
        .args(["apply", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a number"));
    assert!(history_json(&dir, 10).is_empty());
}

#[test]
fn forced_magnitude_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    nudge(&dir)
        .args(["apply", file.to_str().unwrap(), "--magnitude", "0.5", "--sign", "+"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn same_seed_draws_same_delta() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    let draw = || {
        let out = nudge(&dir)
            .args(["--json", "apply", file.to_str().unwrap(), "--seed", "99"])
            .output()
            .unwrap();
        assert!(out.status.success());
        let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
        (v["event"]["magnitude"].clone(), v["event"]["sign"].clone())
    };
    assert_eq!(draw(), draw());
}

#[test]
fn no_banner_reads_first_line_as_header() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "plain.csv", "id,f1\nr1,0.5\n");
    nudge(&dir)
        .args(["apply", file.to_str().unwrap(), "--no-banner"])
        .args(["--magnitude", "0.05", "--sign", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.45"));
}

// ---------------------------------------------------------------------------
// nudge history
// ---------------------------------------------------------------------------

#[test]
fn history_on_fresh_project_is_empty() {
    let dir = TempDir::new().unwrap();
    nudge(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No adjustments recorded yet."));
}

#[test]
fn history_shows_latest_ten_newest_first() {
    let dir = TempDir::new().unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    for _ in 0..15 {
        nudge(&dir)
            .args(["apply", file.to_str().unwrap(), "--select", "b0002"])
            .assert()
            .success();
    }

    let history = history_json(&dir, 10);
    assert_eq!(history.len(), 10);
    let ids: Vec<i64> = history.iter().map(|e| e["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, (6..=15).rev().collect::<Vec<i64>>());

    nudge(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("MAGNITUDE"))
        .stdout(predicate::str::contains("TIMESTAMP"));
}

#[test]
fn history_limit_comes_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".nudge")).unwrap();
    std::fs::write(dir.path().join(".nudge/config.yaml"), "history_limit: 2\n").unwrap();
    let file = write_sheet(&dir, "features.csv", SHEET);
    for _ in 0..4 {
        nudge(&dir)
            .args(["apply", file.to_str().unwrap()])
            .assert()
            .success();
    }

    let out = nudge(&dir).args(["--json", "history"]).output().unwrap();
    let history: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(history.len(), 2);
}
