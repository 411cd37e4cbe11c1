use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A command with every readmind-relevant variable scrubbed, so the
/// developer's real tokens never leak into a test run.
fn readmind_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("readmind"));
    for var in [
        "READWISE_TOKEN",
        "BEEMINDER_TOKEN",
        "BEEMINDER_USERNAME",
        "BEEMINDER_GOAL",
        "READMIND_TAG",
        "READWISE_API_BASE",
        "BEEMINDER_API_BASE",
        "READMIND_STATE_FILE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// =============================================================================
// Basic CLI
// =============================================================================

#[test]
fn test_help() {
    readmind_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Beeminder"));
}

#[test]
fn test_version() {
    readmind_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("readmind"));
}

#[test]
fn test_sync_help_shows_examples() {
    readmind_cmd()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--hours"))
        .stdout(predicate::str::contains("Examples:"));
}

// =============================================================================
// Credential errors are fatal and name the variable
// =============================================================================

#[test]
fn test_missing_readwise_token_is_fatal() {
    readmind_cmd()
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("READWISE_TOKEN"))
        .stderr(predicate::str::contains("readwise.io/access_token"));
}

#[test]
fn test_missing_beeminder_token_is_fatal() {
    readmind_cmd()
        .arg("today")
        .env("READWISE_TOKEN", "rw-test-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BEEMINDER_TOKEN"));
}

// =============================================================================
// Dry-run end to end against mock endpoints
// =============================================================================

#[test]
fn test_sync_dry_run_reports_would_be_post() {
    let rt = Runtime::new().unwrap();
    let readwise = rt.block_on(MockServer::start());
    let state_dir = TempDir::new().unwrap();

    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"id": "a", "title": "First", "tags": ["learning"]},
                    {"id": "b", "title": "Second", "tags": [{"name": "learning"}]},
                    {"id": "c", "title": "Other", "tags": ["videos"]},
                ],
                "nextPageCursor": null,
            })))
            .mount(&readwise),
    );

    let state_path = state_dir.path().join("state.json");
    readmind_cmd()
        .args(["sync", "--dry-run", "--hours", "6", "--tag", "learning"])
        .env("READWISE_TOKEN", "rw-test-token")
        .env("BEEMINDER_TOKEN", "bm-test-token")
        .env("READWISE_API_BASE", readwise.uri())
        .env("READMIND_STATE_FILE", &state_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("MODE: DRY RUN"))
        .stdout(predicate::str::contains("Items archived since last run: 2"))
        .stdout(predicate::str::contains(
            "[DRY RUN] Would post to Beeminder: 2 items",
        ))
        .stdout(predicate::str::contains("Sync Complete"));

    assert!(!state_path.exists(), "dry run must not create state");
}

#[test]
fn test_source_failure_exits_nonzero() {
    let rt = Runtime::new().unwrap();
    let readwise = rt.block_on(MockServer::start());

    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/list/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server on fire"))
            .mount(&readwise),
    );

    readmind_cmd()
        .args(["sync", "--dry-run", "--hours", "6"])
        .env("READWISE_TOKEN", "rw-test-token")
        .env("BEEMINDER_TOKEN", "bm-test-token")
        .env("READWISE_API_BASE", readwise.uri())
        .assert()
        .failure()
        .stderr(predicate::str::contains("500"));
}
