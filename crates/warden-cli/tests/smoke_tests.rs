//! Smoke tests for the warden CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the warden binary with a clean environment
fn warden() -> Command {
    let mut cmd = Command::cargo_bin("warden").expect("warden binary should exist");
    for var in [
        "WARDEN_POOL_SIZE",
        "WARDEN_POOL_EMAIL_PATTERN",
        "WARDEN_POOL_PASSWORD",
        "WARDEN_API_BASE_URL",
        "WARDEN_API_TOKEN",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    warden()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_subcommands() {
    warden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pool"))
        .stdout(predicate::str::contains("contract"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_no_args_fails() {
    warden().assert().failure();
}

// ============================================================================
// pool status
// ============================================================================

#[test]
fn test_pool_status_table() {
    warden()
        .args(["pool", "status", "--size", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("testuser3@example.com"))
        .stdout(predicate::str::contains("3 total, 3 available, 0 in use"));
}

#[test]
fn test_pool_status_json() {
    let output = warden()
        .args(["pool", "status", "--size", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"]["total"], 2);
    assert_eq!(json["users"][1]["id"], "user-2");
}

#[test]
fn test_pool_status_reads_environment() {
    warden()
        .args(["pool", "status"])
        .env("WARDEN_POOL_SIZE", "1")
        .env("WARDEN_POOL_EMAIL_PATTERN", "solo@corp.test")
        .assert()
        .success()
        .stdout(predicate::str::contains("solo@corp.test"));
}

#[test]
fn test_pool_status_flag_overrides_bad_env_pattern() {
    warden()
        .args(["pool", "status", "--size", "2", "--email-pattern", "qa{n}@corp.test"])
        .env("WARDEN_POOL_EMAIL_PATTERN", "fixed@corp.test")
        .assert()
        .success()
        .stdout(predicate::str::contains("qa2@corp.test"));
}

#[test]
fn test_pool_status_rejects_bad_pattern() {
    warden()
        .args(["pool", "status", "--size", "2", "--email-pattern", "fixed@corp.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{n}"));
}

// ============================================================================
// contract check
// ============================================================================

fn write_contract_files(dir: &TempDir, data: &str) -> (String, String) {
    let schema = dir.path().join("deck.json");
    let body = dir.path().join("response.json");
    fs::write(
        &schema,
        r#"{"type":"object","properties":{"id":{"type":"string"},"name":{"type":"string"}},"required":["id","name"]}"#,
    )
    .unwrap();
    fs::write(&body, data).unwrap();
    (
        schema.to_string_lossy().into_owned(),
        body.to_string_lossy().into_owned(),
    )
}

#[test]
fn test_contract_check_passes() {
    let dir = TempDir::new().unwrap();
    let (schema, data) = write_contract_files(&dir, r#"{"id":"1","name":"Spanish"}"#);
    warden()
        .args(["contract", "check", "--schema", &schema, "--data", &data])
        .assert()
        .success()
        .stdout(predicate::str::contains("deck is valid"));
}

#[test]
fn test_contract_check_reports_field_paths() {
    let dir = TempDir::new().unwrap();
    let (schema, data) = write_contract_files(&dir, r#"{"id":1,"name":"Spanish"}"#);
    warden()
        .args(["contract", "check", "-s", &schema, "-d", &data])
        .args(["--context", "GET /decks/1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/id"))
        .stderr(predicate::str::contains("GET /decks/1"));
}

#[test]
fn test_contract_check_lenient_allows_extra_fields() {
    let dir = TempDir::new().unwrap();
    let (schema, data) = write_contract_files(&dir, r#"{"id":"1","name":"S","owner":"u1"}"#);
    warden()
        .args(["contract", "check", "-s", &schema, "-d", &data])
        .assert()
        .failure();
    warden()
        .args(["contract", "check", "-s", &schema, "-d", &data, "--mode", "lenient"])
        .assert()
        .success();
}

// ============================================================================
// cleanup
// ============================================================================

#[test]
fn test_cleanup_replays_ledger() {
    let mut server = mockito::Server::new();
    let card = server
        .mock("DELETE", "/cards/c1")
        .match_header("authorization", "Bearer secret")
        .with_status(204)
        .expect(1)
        .create();
    let deck = server
        .mock("DELETE", "/decks/d1")
        .with_status(404)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let ledger = dir.path().join("ledger.json");
    let mut tracker = warden::CleanupTracker::new();
    tracker.track(warden::TrackedResource::api("deck", "d1", "Deck", "/decks/d1"));
    tracker.track(warden::TrackedResource::api("card", "c1", "Card", "/cards/c1"));
    tracker.save_ledger(&ledger).unwrap();

    warden()
        .args(["cleanup", "--ledger", ledger.to_str().unwrap()])
        .args(["--base-url", &server.url(), "--token", "secret", "--delay-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 of 2"));

    card.assert();
    deck.assert();
}

#[test]
fn test_cleanup_failure_exits_non_zero() {
    let mut server = mockito::Server::new();
    let failing = server
        .mock("DELETE", "/decks/d1")
        .with_status(500)
        .with_body("locked")
        .expect(2)
        .create();

    let dir = TempDir::new().unwrap();
    let ledger = dir.path().join("ledger.json");
    let failures = dir.path().join("failures.json");
    let mut tracker = warden::CleanupTracker::new();
    tracker.track(warden::TrackedResource::api("deck", "d1", "Deck", "/decks/d1"));
    tracker.save_ledger(&ledger).unwrap();

    warden()
        .args(["cleanup", "--ledger", ledger.to_str().unwrap()])
        .args(["--base-url", &server.url(), "--attempts", "2", "--delay-ms", "0"])
        .args(["--failures-out", failures.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 resource(s) could not be cleaned up"));

    failing.assert();
    assert!(fs::read_to_string(failures).unwrap().contains("locked"));
}

#[test]
fn test_cleanup_missing_ledger() {
    warden()
        .args(["cleanup", "--ledger", "/nonexistent/ledger.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
