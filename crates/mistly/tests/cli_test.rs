//! Integration tests for the `mistly` CLI binary.
//!
//! Argument parsing, help output, and error exits run offline; API-bound
//! commands run against wiremock and a local WebSocket server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use futures_util::{SinkExt, StreamExt};
use predicates::prelude::*;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `mistly` binary with env isolation.
///
/// Clears all `MIST_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn mistly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mistly");
    cmd.env("HOME", "/tmp/mistly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/mistly-cli-test-nonexistent")
        .env_remove("RUST_LOG");
    for var in [
        "MIST_PROFILE",
        "MIST_BASE_URL",
        "MIST_API_KEY",
        "MIST_STREAM_URL",
        "MIST_OUTPUT",
        "MIST_TIMEOUT",
        "MIST_ORG",
        "MIST_SITE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run a prepared command off the async runtime and return its output.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = mistly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    mistly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Mist cloud API")
            .and(predicate::str::contains("whoami"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("stream")),
    );
}

#[test]
fn test_version_flag() {
    mistly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mistly"));
}

#[test]
fn test_completions_bash() {
    mistly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_stream_requires_site() {
    mistly_cmd()
        .args(["stream", "devices"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--site"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_api_key() {
    mistly_cmd()
        .arg("whoami")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn test_unknown_profile() {
    mistly_cmd()
        .args(["--profile", "nope", "whoami"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_stream_from_underivable_base_url() {
    mistly_cmd()
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "--api-key",
            "k",
            "stream",
            "devices",
            "--site",
            "S",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api."));
}

// ── REST commands ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/O/sites"))
        .and(header("Authorization", "Token testAPIKey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s2", "name": "Warehouse" },
            { "id": "s1", "name": "Office" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = mistly_cmd();
    cmd.args(["--base-url", &server.uri(), "--api-key", "testAPIKey"])
        .args(["-o", "json-compact", "sites", "--org", "O"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let sites: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sites[0]["name"], "Office");
    assert_eq!(sites[1]["name"], "Warehouse");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tickets_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/O/tickets/count"))
        .and(query_param("distinct", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "status": "open", "count": 12 },
                { "status": "closed", "count": 7 }
            ]
        })))
        .mount(&server)
        .await;

    let mut cmd = mistly_cmd();
    cmd.args(["--base-url", &server.uri(), "--api-key", "k"])
        .args(["tickets", "--org", "O"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let table = String::from_utf8_lossy(&output.stdout);
    assert!(table.contains("open") && table.contains("12"), "{table}");
    assert!(table.contains("closed") && table.contains('7'), "{table}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/missing/devices"))
        .respond_with(ResponseTemplate::new(404).set_body_string("site not found"))
        .mount(&server)
        .await;

    let mut cmd = mistly_cmd();
    cmd.args(["--base-url", &server.uri(), "--api-key", "k"])
        .args(["devices", "--site", "missing"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("site not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/self"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let mut cmd = mistly_cmd();
    cmd.args(["--base-url", &server.uri(), "--api-key", "bad", "whoami"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

// ── Streaming ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_stream_devices_prints_ndjson_and_unsubscribes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

        let mut received = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            received.push(text.as_str().to_owned());
            if received.len() == 1 {
                let ack = json!({ "event": "channel_subscribed", "channel": "/sites/S/stats/devices" });
                ws.send(Message::text(ack.to_string())).await.unwrap();
                for n in 1..=3 {
                    let frame = json!({
                        "event": "data",
                        "channel": "/sites/S/stats/devices",
                        "data": json!({ "mac": format!("m{n}"), "num_clients": n }).to_string()
                    });
                    ws.send(Message::text(frame.to_string())).await.unwrap();
                }
            }
        }
        received
    });

    let mut cmd = mistly_cmd();
    cmd.args(["--api-key", "k"])
        .args(["--stream-url", &format!("ws://{addr}/api-ws/v1/stream")])
        .args(["stream", "devices", "--site", "S", "--count", "2"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["mac"], "m1");
    assert_eq!(lines[1]["num_clients"], 2);

    let received = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        received,
        vec![
            r#"{"subscribe":"/sites/S/stats/devices"}"#.to_owned(),
            r#"{"unsubscribe":"/sites/S/stats/devices"}"#.to_owned(),
        ]
    );
}
