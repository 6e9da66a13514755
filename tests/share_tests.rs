use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Build an isolated home directory with its own database location.
fn make_home() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".rota");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n", db_path.display()),
    )
    .unwrap();
    temp_dir
}

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = make_home();
    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    (temp_dir, guard)
}

fn get_rota_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rota").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env("COLUMNS", "200");
    cmd
}

#[test]
fn test_share_token_carries_state_to_another_home() {
    let (home_a, _guard) = setup_test_env();

    get_rota_cmd(&home_a)
        .args(["team", "rename", "1", "Falcons"])
        .assert()
        .success();

    let output = get_rota_cmd(&home_a)
        .args(["share"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let token = String::from_utf8(output).unwrap().trim().to_string();
    assert!(!token.is_empty());
    assert!(token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));

    // A second machine, importing only the token, sees the same rotation.
    let home_b = make_home();
    get_rota_cmd(&home_b)
        .args(["import", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported rotation with 10 stages."));

    get_rota_cmd(&home_b)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Falcons"));
}

#[test]
fn test_share_base_url_embeds_fragment() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["share", "--base", "https://rota.example/board"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://rota.example/board#s="));
}

#[test]
fn test_import_accepts_full_url() {
    let (home_a, _guard) = setup_test_env();

    get_rota_cmd(&home_a)
        .args(["team", "rename", "3", "Otters"])
        .assert()
        .success();

    let output = get_rota_cmd(&home_a)
        .args(["share", "--base", "https://rota.example/board"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let url = String::from_utf8(output).unwrap().trim().to_string();

    let home_b = make_home();
    get_rota_cmd(&home_b)
        .args(["import", &url])
        .assert()
        .success();

    get_rota_cmd(&home_b)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Otters"));
}

#[test]
fn test_export_import_round_trip_via_stdin() {
    let (home_a, _guard) = setup_test_env();

    get_rota_cmd(&home_a)
        .args(["team", "rename", "1", "Falcons"])
        .assert()
        .success();
    get_rota_cmd(&home_a)
        .args(["set", "mode", "manual"])
        .assert()
        .success();
    get_rota_cmd(&home_a)
        .args(["set", "round", "7"])
        .assert()
        .success();

    let exported = String::from_utf8(
        get_rota_cmd(&home_a)
            .args(["export"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone(),
    )
    .unwrap();
    assert!(exported.trim_start().starts_with('{'));

    let home_b = make_home();
    get_rota_cmd(&home_b)
        .args(["import", "-"])
        .write_stdin(exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported rotation with 10 stages."));

    get_rota_cmd(&home_b)
        .assert()
        .success()
        .stdout(predicate::str::contains("Falcons"))
        .stdout(predicate::str::contains("Round 7 of 10"));
}

#[test]
fn test_import_from_file() {
    let (temp_dir, _guard) = setup_test_env();

    let snapshot_path = temp_dir.path().join("saved.json");
    let exported = get_rota_cmd(&temp_dir)
        .args(["export"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    fs::write(&snapshot_path, exported).unwrap();

    get_rota_cmd(&temp_dir)
        .args(["import", snapshot_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported rotation with 10 stages."));
}

#[test]
fn test_import_heals_partial_snapshots() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["import", r#"{"stageCount": 4}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Repaired fields during import"))
        .stdout(predicate::str::contains("Imported rotation with 4 stages."));

    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1 of 4"))
        .stdout(predicate::str::contains("Team 4"));
}

#[test]
fn test_import_rejects_garbage_token() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["import", "not a token!"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid share token"));
}

#[test]
fn test_import_rejects_malformed_json() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["import", "{not json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid snapshot JSON"));
}

#[test]
fn test_export_formats() {
    let (temp_dir, _guard) = setup_test_env();

    // Compact by default, one line
    let compact = String::from_utf8(
        get_rota_cmd(&temp_dir)
            .args(["export"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone(),
    )
    .unwrap();
    assert_eq!(compact.trim_end().lines().count(), 1);
    assert!(compact.contains(r#""stageCount":10"#));

    let pretty = String::from_utf8(
        get_rota_cmd(&temp_dir)
            .args(["export", "--pretty"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone(),
    )
    .unwrap();
    assert!(pretty.lines().count() > 1);
    assert!(pretty.contains(r#""stageCount": 10"#));
}

#[test]
fn test_snapshot_survives_process_restarts() {
    let (temp_dir, _guard) = setup_test_env();

    // Each command is a separate process; state flows through the database.
    get_rota_cmd(&temp_dir)
        .args(["set", "mode", "manual"])
        .assert()
        .success();
    get_rota_cmd(&temp_dir)
        .args(["set", "round", "3"])
        .assert()
        .success();
    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "5", "Herons"])
        .assert()
        .success();

    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 3 of 10"))
        .stdout(predicate::str::contains("Herons"));
}
