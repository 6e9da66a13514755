use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a temporary database and set it as the data location
fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    // Create config file
    let config_dir = temp_dir.path().join(".rota");
    fs::create_dir_all(&config_dir).unwrap();
    let config_file = config_dir.join("rc");
    fs::write(&config_file, format!("data.location={}\n", db_path.display())).unwrap();

    // Set HOME to temp_dir so the config file is found
    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    (temp_dir, guard)
}

fn get_rota_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rota").unwrap();
    cmd.env("HOME", temp_dir.path());
    // Wide enough that the table shrinker never clips names
    cmd.env("COLUMNS", "200");
    cmd
}

#[test]
fn test_default_display_shows_full_rotation() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1 of 10 (next: 2)"))
        .stdout(predicate::str::contains("Stage 1"))
        .stdout(predicate::str::contains("Stage 10"))
        .stdout(predicate::str::contains("Team 10"))
        .stdout(predicate::str::contains("Supervisor A"))
        .stdout(predicate::str::contains("Rotation looks good"));
}

#[test]
fn test_fresh_state_warns_about_missing_start_time() {
    let (temp_dir, _guard) = setup_test_env();

    // Scheduled mode with no start time pins the round to 1.
    get_rota_cmd(&temp_dir)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1 of 10"))
        .stdout(predicate::str::contains("start time is empty or invalid"));
}

#[test]
fn test_rename_team_persists() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "2", "Tigers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed team 2 to 'Tigers'"));

    get_rota_cmd(&temp_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tigers"))
        .stdout(predicate::str::contains("Stage 2 (#2)"));

    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tigers"));
}

#[test]
fn test_multi_word_rename() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "1", "Red", "Dragons"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed team 1 to 'Red Dragons'"));
}

#[test]
fn test_blank_rename_falls_back_to_default_name() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "2", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Blank name, using 'Team 2'."));

    get_rota_cmd(&temp_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team 2"));
}

#[test]
fn test_teams_addressable_by_name() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "2", "Tigers"])
        .assert()
        .success();

    // Case-insensitive exact name match
    get_rota_cmd(&temp_dir)
        .args(["team", "start", "tigers", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team 2 now starts at stage 5."));

    get_rota_cmd(&temp_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage 5 (#5)"));
}

#[test]
fn test_unknown_team_number_is_an_error() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "start", "15", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Invalid team number: 15. Expected 1-10."));
}

#[test]
fn test_unknown_team_name_is_an_error() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "Ghosts", "Anything"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No team named 'Ghosts'"));
}

#[test]
fn test_ambiguous_team_name_is_an_error() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "1", "Dup"])
        .assert()
        .success();
    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "2", "Dup"])
        .assert()
        .success();

    get_rota_cmd(&temp_dir)
        .args(["team", "start", "Dup", "3"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Multiple teams named 'Dup'"));
}

#[test]
fn test_shared_starting_stage_is_warned_and_marked() {
    let (temp_dir, _guard) = setup_test_env();

    // Two teams starting on stage 1 collide in every round.
    get_rota_cmd(&temp_dir)
        .args(["team", "start", "2", "1"])
        .assert()
        .success();

    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("duplicate starting stages (1)"))
        .stdout(predicate::str::contains("collision this round on stage 1"))
        .stdout(predicate::str::contains("⚠ collision"))
        .stdout(predicate::str::contains("Rotation looks good").not());
}

#[test]
fn test_stage_rename_and_supervisor_lifecycle() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["stage", "rename", "3", "Archery", "Range"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed stage 3 to 'Archery Range'"));

    get_rota_cmd(&temp_dir)
        .args(["stage", "supervisor", "3", "Dana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage 3 supervisor is now Dana."));

    get_rota_cmd(&temp_dir)
        .args(["stage", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Archery Range"))
        .stdout(predicate::str::contains("Dana"));

    // Omitting the name clears the assignment
    get_rota_cmd(&temp_dir)
        .args(["stage", "supervisor", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared the supervisor for stage 3."));

    get_rota_cmd(&temp_dir)
        .args(["stage", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dana").not());
}

#[test]
fn test_set_view_changes_default_grouping() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["set", "view", "teams"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default view set to teams."));

    // Team view labels stages as "Name (#n)"
    get_rota_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage 1 (#1)"));

    // Explicit flag overrides the stored view
    get_rota_cmd(&temp_dir)
        .args(["show", "--stages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supervisor"));
}

#[test]
fn test_show_json_report() {
    let (temp_dir, _guard) = setup_test_env();

    let output = get_rota_cmd(&temp_dir)
        .args(["show", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["round"], 1);
    assert_eq!(report["stageCount"], 10);
    assert_eq!(report["stages"][0]["now"]["team"], "Team 1");
    assert_eq!(report["stages"][0]["now"]["collision"], false);
    assert_eq!(report["teams"][9]["startStage"], 10);
    let kinds: Vec<&str> = report["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"inactiveSchedule"));
}

#[test]
fn test_reset_restores_defaults() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["team", "rename", "2", "Tigers"])
        .assert()
        .success();

    get_rota_cmd(&temp_dir)
        .args(["reset", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation reset to defaults."));

    get_rota_cmd(&temp_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tigers").not())
        .stdout(predicate::str::contains("Team 2"));
}

#[test]
fn test_version_flag() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rota"));
}

#[test]
fn test_help_shows_subcommands() {
    let (temp_dir, _guard) = setup_test_env();

    get_rota_cmd(&temp_dir)
        .args(["--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage rotation tracker"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("share"));
}
