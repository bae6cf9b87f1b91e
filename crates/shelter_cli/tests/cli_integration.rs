use std::path::Path;
use std::process::{Command, Output};

fn shelter(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shelter"))
        .args(args)
        .arg("--db")
        .arg(db)
        .env_remove("SHELTER_LOG_DIR")
        .output()
        .expect("failed to run shelter")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn ping_prints_pong() {
    let output = Command::new(env!("CARGO_BIN_EXE_shelter"))
        .arg("ping")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("ping=pong"));
}

#[test]
fn dummy_then_list_shows_tommy() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shelter.db");

    let inserted = shelter(&db, &["dummy"]);
    assert!(inserted.status.success());
    assert!(stdout(&inserted).contains("content://com.example.android.pets/pets/1"));

    let listed = shelter(&db, &["list"]);
    assert!(listed.status.success());
    assert_eq!(stdout(&listed).trim(), "1\tTommy\tTommy");
}

#[test]
fn list_json_emits_full_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shelter.db");
    assert!(shelter(&db, &["add", "--name", "Luna", "--gender", "female", "--weight", "3"])
        .status
        .success());

    let listed = shelter(&db, &["list", "--json"]);
    let rows: serde_json::Value = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(rows[0]["_id"], 1);
    assert_eq!(rows[0]["name"], "Luna");
    assert_eq!(rows[0]["gender"], "female");
    assert_eq!(rows[0]["weight"], 3);
}

#[test]
fn invalid_input_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shelter.db");

    let negative = shelter(&db, &["add", "--name", "Rex", "--weight", "-2"]);
    assert!(!negative.status.success());
    assert!(String::from_utf8_lossy(&negative.stderr).contains("non-negative weight"));

    let bad_gender = shelter(&db, &["add", "--name", "Rex", "--gender", "5"]);
    assert!(!bad_gender.status.success());
}

#[test]
fn remove_reports_count_and_tolerates_missing_id() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shelter.db");
    assert!(shelter(&db, &["dummy"]).status.success());

    let missing = shelter(&db, &["remove", "42"]);
    assert!(missing.status.success());
    assert_eq!(stdout(&missing).trim(), "removed 0");

    let removed = shelter(&db, &["remove", "1"]);
    assert!(removed.status.success());
    assert_eq!(stdout(&removed).trim(), "removed 1");
    assert_eq!(stdout(&shelter(&db, &["list"])).trim(), "no pets");
}

#[test]
fn update_and_clear_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shelter.db");
    assert!(shelter(&db, &["dummy"]).status.success());

    let updated = shelter(&db, &["update", "1", "--weight", "9", "--clear-breed"]);
    assert!(updated.status.success());
    assert_eq!(stdout(&updated).trim(), "updated 1");

    let shown = shelter(&db, &["show", "1"]);
    assert_eq!(stdout(&shown).trim(), "1\tTommy\t\tmale\t9");

    let cleared = shelter(&db, &["clear"]);
    assert_eq!(stdout(&cleared).trim(), "removed 1 pets");
    assert_eq!(stdout(&shelter(&db, &["list"])).trim(), "no pets");
}
