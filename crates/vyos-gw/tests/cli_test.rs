//! Integration tests for the `vyos-gw` binary.
//!
//! Argument parsing, config handling and request dispatch, run against
//! wiremock doubles instead of real routers.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vyos-gw` binary with env isolation.
///
/// Clears `VYOS_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gw_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vyos-gw");
    cmd.env("HOME", "/tmp/vyos-gw-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/vyos-gw-test-nonexistent")
        .env_remove("VYOS_HOSTS")
        .env_remove("VYOS_GW_CONFIG")
        .env_remove("VYOS_GW_OUTPUT")
        .env_remove("VYOS_GW_INSECURE")
        .env_remove("VYOS_GW_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// `gw_cmd` with one device `r1` pointed at `server`.
fn gw_with_device(server_uri: &str) -> assert_cmd::Command {
    let mut cmd = gw_cmd();
    cmd.env("VYOS_HOSTS", format!("r1:{server_uri}:test-key"));
    cmd
}

/// A URI nothing listens on.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn config_arg(path: &Path) -> String {
    path.display().to_string()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gw_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gw_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("request")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    gw_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vyos-gw"));
}

#[test]
fn test_completions_bash() {
    gw_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_method_is_usage_error() {
    gw_cmd()
        .args(["request", "NO SUCH", "/health"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid HTTP method"));
}

// ── Gateway requests ────────────────────────────────────────────────

#[test]
fn test_health_needs_no_devices() {
    gw_cmd()
        .args(["request", "get", "/health", "-o", "json-compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"status":"ok"}"#));
}

#[test]
fn test_unknown_device_exits_not_found() {
    gw_cmd()
        .args(["request", "GET", "/devices/r9/vrfs"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("device not found: r9"));
}

#[test]
fn test_unknown_route_exits_not_found() {
    gw_cmd()
        .args(["request", "GET", "/nowhere"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("no route for GET /nowhere"));
}

#[test]
fn test_malformed_body_rejected_before_device_call() {
    gw_with_device(&closed_port_uri())
        .args(["request", "POST", "/devices/r1/vrfs", "--data", "{bad"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON body"));
}

#[test]
fn test_unreachable_device_exits_connection() {
    gw_with_device(&closed_port_uri())
        .args([
            "request",
            "POST",
            "/devices/r1/vrfs",
            "--data",
            r#"{"name":"MGMT","table":"100"}"#,
        ])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("device communication error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_vrf_list_through_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"name": {"MGMT": {"table": "100", "description": "mgmt"}}},
            "error": null
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        gw_with_device(&uri)
            .args(["request", "GET", "/devices/r1/vrfs", "-o", "json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["name"], "MGMT");
    assert_eq!(body[0]["table"], "100");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_data_file_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/configure"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "data": null, "error": null
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let body = dir.path().join("route.json");
    std::fs::write(
        &body,
        r#"{"network":"10.20.0.0/16","next_hop":"192.168.1.254"}"#,
    )
    .unwrap();

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        gw_with_device(&uri)
            .args(["request", "POST", "/devices/r1/routes", "-o", "json-compact"])
            .arg("--data-file")
            .arg(&body)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("10.20.0.0/16"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_table_reports_health() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrieve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "data": "vyos", "error": null
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let mut cmd = gw_with_device(&uri);
        cmd.env(
            "VYOS_HOSTS",
            format!("r1:{uri}:key,r2:{}:key", closed_port_uri()),
        );
        cmd.args(["devices", "--color", "never"]).output().unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let r1 = stdout.lines().find(|l| l.contains("r1")).unwrap();
    let r2 = stdout.lines().find(|l| l.contains("r2")).unwrap();
    assert!(r1.contains("yes"), "{stdout}");
    assert!(r2.contains("no"), "{stdout}");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    gw_cmd()
        .args(["config", "path", "--config", "/tmp/vyos-gw-elsewhere.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/vyos-gw-elsewhere.toml"));
}

#[test]
fn test_config_init_add_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_arg(&dir.path().join("config.toml"));

    gw_cmd().args(["config", "init", "--config", &cfg]).assert().success();
    gw_cmd()
        .args(["config", "init", "--config", &cfg])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("already exists"));

    gw_cmd()
        .args([
            "config",
            "add-device",
            "r1",
            "--url",
            "https://10.0.0.1:443",
            "--api-key-env",
            "R1_KEY",
            "--config",
            &cfg,
        ])
        .assert()
        .success();

    let output = gw_cmd()
        .args(["config", "show", "-o", "json", "--config", &cfg])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["defaults"]["timeout"], 30);
    assert_eq!(shown["devices"]["r1"]["url"], "https://10.0.0.1:443");
    assert_eq!(shown["devices"]["r1"]["api_key_env"], "R1_KEY");
}

#[test]
fn test_config_show_redacts_hosts_keys() {
    let output = gw_cmd()
        .env("VYOS_HOSTS", "r1:https://10.0.0.1:443:super-secret")
        .args(["config", "show", "--config", "/tmp/vyos-gw-test-nonexistent/c.toml"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("10.0.0.1"));
    assert!(!stdout.contains("super-secret"));
}

#[test]
fn test_config_env_layer_uses_own_prefix() {
    let output = gw_cmd()
        .env("VYOS_GW_TIMEOUT", "99")
        .env("VYOS_GW_DEFAULTS__PROBE_TIMEOUT", "99")
        .env("VYOS_GW_CFG_DEFAULTS__TIMEOUT", "45")
        .args(["config", "show", "-o", "json", "--config", "/tmp/vyos-gw-test-nonexistent/c.toml"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["defaults"]["timeout"], 45);
    assert_eq!(shown["defaults"]["probe_timeout"], 5);
}

#[test]
fn test_remove_unknown_device() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_arg(&dir.path().join("config.toml"));
    gw_cmd()
        .args(["config", "remove-device", "ghost", "--config", &cfg])
        .assert()
        .code(4);
}
