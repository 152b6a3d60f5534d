// Integration tests for the `cronhelper` binary. None of these reach the
// network: every case fails or finishes before a request would be sent.

use assert_cmd::Command;
use predicates::prelude::*;

fn cronhelper() -> Command {
    let mut cmd = Command::cargo_bin("cronhelper").unwrap();
    cmd.env_remove("RTO_API_URL")
        .env_remove("RTO_DASHBOARD_ID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags() {
    cronhelper().arg("--help").assert().success().stdout(
        predicate::str::contains("--action")
            .and(predicate::str::contains("--nosleep"))
            .and(predicate::str::contains("--config")),
    );
}

#[test]
fn bogus_action_is_rejected() {
    cronhelper()
        .args(["--action", "bogus", "--api", "https://rtoapi.example.com/", "--id", "abc"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Invalid action \"bogus\" (expected checkin, stats or init)",
        ));
}

#[test]
fn empty_api_url_aborts() {
    cronhelper()
        .args(["--action", "checkin", "--nosleep", "--api", "", "--id", "abc"])
        .assert()
        .code(78)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("API endpoint is required"));
}

#[test]
fn empty_dashboard_id_aborts() {
    cronhelper()
        .args(["--action", "stats", "--api", "https://rtoapi.example.com/", "--id", ""])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("dashboard id is required"));
}

#[test]
fn dashboard_id_from_env_is_still_validated() {
    cronhelper()
        .env("RTO_DASHBOARD_ID", "abc")
        .args(["--action", "stats", "--api", "not a url"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("invalid API endpoint"));
}

#[test]
fn missing_config_file_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtoconfig.json");
    cronhelper()
        .args(["--action", "stats", "--config", "--config-path"])
        .arg(&path)
        .assert()
        .code(78)
        .stderr(predicate::str::contains("error opening config file"));
}

#[test]
fn init_creates_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtoconfig.json");

    cronhelper()
        .args(["--action", "init", "--api", "https://rtoapi.example.com/", "--config-path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Config file created successfully")
                .and(predicate::str::contains("Please fill in your unique dashboard details")),
        );

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["api_url"], "https://rtoapi.example.com/");
    assert_eq!(written["dashboard_id"], "");

    cronhelper()
        .args(["--action", "init", "--config-path"])
        .arg(&path)
        .assert()
        .code(78)
        .stderr(predicate::str::contains("config file already exists"));
}
