//! End-to-end tests for the depaudit CLI
//!
//! These tests verify:
//! - Validation failures exit with status 1 before any package is evaluated
//! - A full run against a mock Galaxy server prints the report
//! - JSON output schema and exit codes for compatible runs
//! - Log file delivery

use assert_cmd::Command;
use mockito::{Matcher, Mock, Server, ServerGuard};
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const INDEX: &str = "/api/v3/plugin/ansible/content/published/collections/index";

fn depaudit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_depaudit"));
    cmd.env_remove("RUST_LOG").env_remove("DEPAUDIT_WEBHOOK_TOKEN");
    cmd
}

fn mock_collection(server: &mut ServerGuard, name: &str, latest: &str, deprecated: bool) -> Mock {
    server
        .mock("GET", format!("{}/{}/", INDEX, name).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"deprecated": {}, "highest_version": {{"version": "{}"}}}}"#,
            deprecated, latest
        ))
        .create()
}

fn mock_dependencies(server: &mut ServerGuard, name: &str, version: &str, deps: &str) -> Mock {
    server
        .mock(
            "GET",
            format!("{}/{}/versions/{}/", INDEX, name, version).as_str(),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"metadata": {{"dependencies": {}}}}}"#, deps))
        .create()
}

/// Galaxy with acme.foo (target), acme.baz, and acme.bar depending on both
fn galaxy() -> (ServerGuard, Vec<Mock>) {
    let mut server = Server::new();
    let mocks = vec![
        mock_collection(&mut server, "acme/foo", "4.2.0", false),
        mock_collection(&mut server, "acme/baz", "0.6.0", false),
        mock_collection(&mut server, "acme/bar", "2.0.0", false),
        mock_dependencies(
            &mut server,
            "acme/bar",
            "2.0.0",
            r#"{"acme.foo": ">=1.1.0,<5.0.0", "acme.baz": ">=0.2.4,<1.0.0"}"#,
        ),
        server
            .mock("GET", Matcher::Regex(format!("^{}/acme/missing/", INDEX)))
            .with_status(404)
            .create(),
    ];
    (server, mocks)
}

fn package_list(dir: &TempDir, names: &[&str]) -> PathBuf {
    let path = dir.path().join("packages.yml");
    let body: String = names.iter().map(|n| format!("- {}\n", n)).collect();
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_malformed_version_fails_validation() {
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);

    depaudit()
        .args(["acme/foo", "not-a-version", "--registry-url", "http://127.0.0.1:9"])
        .arg("--packages")
        .arg(&list)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Validation failed"))
        .stderr(predicate::str::contains("not-a-version"));
}

#[test]
fn test_unknown_target_fails_validation() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);

    depaudit()
        .args(["acme/missing", "1.0.0", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("acme.missing"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_missing_package_list_fails_validation() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();

    depaudit()
        .args(["acme/foo", "5.0.1", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(dir.path().join("absent.yml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("package list"));
}

#[test]
fn test_mismatch_report() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar", "acme/missing"]);

    depaudit()
        .args(["acme/foo", "5.0.1", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Checking compatibility with acme.foo 5.0.1",
        ))
        .stdout(predicate::str::contains(
            "acme.foo (>=1.1.0 <5.0.0) *doesn't match* 5.0.1 [override]",
        ))
        .stdout(predicate::str::contains("acme/missing:\n  not found on registry"))
        .stdout(predicate::str::contains(
            "Summary: 2 package(s) checked, 1 with mismatches, 1 not found",
        ));
}

#[test]
fn test_verbose_lists_matches() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);

    depaudit()
        .args(["acme/foo", "4.5", "--verbose", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "acme.baz (>=0.2.4 <1.0.0) *matches* 0.6.0",
        ))
        .stdout(predicate::str::contains("All dependencies match"));
}

#[test]
fn test_json_output_schema() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);

    let output = depaudit()
        .args(["acme/foo", "4.9.9", "--json", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["target"], "acme.foo");
    assert_eq!(json["version"], "4.9.9");
    assert_eq!(json["compatible"], true);
    assert_eq!(json["summary"]["checked"], 1);
    assert_eq!(json["summary"]["evaluated"], 1);
    assert_eq!(json["summary"]["deprecated"], 0);
    assert_eq!(json["packages"][0]["name"], "acme/bar");
    assert_eq!(json["packages"][0]["all_satisfied"], true);
}

#[test]
fn test_log_file_receives_report() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);
    let log = dir.path().join("audit.log");

    depaudit()
        .args(["acme/foo", "5.0.1", "--quiet", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .arg("--log-file")
        .arg(&log)
        .assert()
        .code(2);

    let content = fs::read_to_string(&log).unwrap();
    assert!(content.starts_with("===== "));
    assert!(content.contains("Summary: 1 package(s) checked, 1 with mismatches, 0 not found"));
}

#[test]
fn test_webhook_without_token_exits_with_delivery_failure() {
    let (server, _mocks) = galaxy();
    let dir = TempDir::new().unwrap();
    let list = package_list(&dir, &["acme/bar"]);

    depaudit()
        .args(["acme/foo", "4.0.0", "--registry-url", server.url().as_str()])
        .arg("--packages")
        .arg(&list)
        .args(["--webhook-url", format!("{}/hook", server.url()).as_str()])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("All dependencies match"))
        .stderr(predicate::str::contains("Delivery failed"));
}
