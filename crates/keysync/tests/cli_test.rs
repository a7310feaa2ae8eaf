//! Integration tests for the `keysync` CLI binary.
//!
//! Argument parsing, config handling and exit codes run offline. The full
//! `run` tests point every service at a local wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `keysync` binary with env isolation.
///
/// Clears `KEYSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn keysync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.env("HOME", "/tmp/keysync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/keysync-cli-test-nonexistent")
        .env_remove("KEYSYNC_CONFIG")
        .env_remove("KEYSYNC_OUTPUT")
        .env_remove("KEYSYNC_LOG_FILE")
        .env_remove("KEYSYNC_BOOKING__API_KEY")
        .env_remove("KEYSYNC_LOCK__USERNAME")
        .env_remove("KEYSYNC_LOCK__PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = keysync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    keysync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("codes"))
            .and(predicate::str::contains("bookings"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    keysync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keysync"));
}

#[test]
fn test_completions_bash() {
    keysync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_codes_list_requires_numeric_lock() {
    keysync_cmd()
        .args(["codes", "list", "front-door"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    keysync_cmd()
        .args(["--config", "/etc/keysync/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/keysync/custom.toml"));
}

#[test]
fn test_config_show_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(
        dir.path(),
        r#"
        [booking]
        api_key = "super-secret-key"

        [lock]
        username = "ops@example.com"
        password = "hunter2"

        [apartment_locks]
        "555" = 100
        "#,
    );

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ops@example.com")
                .and(predicate::str::contains("\"****\""))
                .and(predicate::str::contains("\"555\" = \"100\""))
                .and(predicate::str::contains("super-secret-key").not())
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_check_reports_bad_field() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(
        dir.path(),
        r#"
        [sync]
        check_in = "late"
        "#,
    );

    let output = keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "check"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("sync.check_in"), "{text}");
}

#[test]
fn test_config_check_warns_when_nothing_is_mapped() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(
        dir.path(),
        r#"
        [booking]
        api_key = "bk-test"

        [lock]
        username = "ops@example.com"
        password = "hunter2"
        "#,
    );

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["--color", "never", "config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration OK: 0 apartment(s)"))
        .stderr(predicate::str::contains("no apartments are mapped"));
}

#[test]
fn test_config_init_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("keysync/config.toml");

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("tag_prefix = \"Smoobu\"")
                .and(predicate::str::contains("retention_days = 7")),
        );

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_missing_explicit_config_is_usage_error() {
    keysync_cmd()
        .args(["--config", "/tmp/keysync-cli-test-nonexistent/nope.toml", "run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_without_credentials_exits_auth() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path(), "[sync]\nretention_days = 7\n");

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("booking API key"));
}

// ── Full runs against a mock ────────────────────────────────────────

fn day_offset(days: i64) -> String {
    (chrono::Local::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn mock_config(dir: &Path, server: &MockServer) -> PathBuf {
    write_config(
        dir,
        &format!(
            r#"
            [booking]
            api_key = "bk-test"
            base_url = "{uri}"

            [lock]
            username = "ops@example.com"
            password = "hunter2"
            base_url = "{uri}"

            [apartment_locks]
            "555" = 100

            [lock_accessoires]
            "100" = "K100"
            "#,
            uri = server.uri()
        ),
    )
}

async fn mount_common(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt" })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page_count": 1,
            "page": 1,
            "total_items": 1,
            "bookings": [{
                "id": 42,
                "guest-name": "Jane Doe",
                "arrival": day_offset(10),
                "departure": day_offset(14),
                "apartment": { "id": 555, "name": "Old Town Loft" },
                "type": "reservation"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fr/api/v2/partage/all/serrure/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "partages_accessoire": [] }
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_creates_code_and_messages_guest() {
    let server = MockServer::start().await;
    mount_common(&server).await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/create/100/accessoire/K100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": { "id": 9001, "code": "4821" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/reservations/42/messages/send-message-to-guest"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = mock_config(dir.path(), &server);

    let output = keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["-o", "json", "run"])
        .output()
        .unwrap();
    let text = combined_output(&output);
    assert!(output.status.success(), "{text}");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["created"], 1);
    assert_eq!(report["errors"], 0);
    assert_eq!(report["dry_run"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_common(&server).await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/fr/api/v2/partage/(create|accessoire)/.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/api/reservations/.*/messages/.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = mock_config(dir.path(), &server);

    let output = keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .args(["-o", "json", "run", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["created"], 1);
    assert_eq!(report["dry_run"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login_check"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials." })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = mock_config(dir.path(), &server);

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_create_exits_one() {
    let server = MockServer::start().await;
    mount_common(&server).await;

    Mock::given(method("POST"))
        .and(path("/fr/api/v2/partage/create/100/accessoire/K100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 400,
            "message": "code already in use"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cfg = mock_config(dir.path(), &server);

    keysync_cmd()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed during the run"));
}
