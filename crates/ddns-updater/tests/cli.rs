//! End-to-end runs of the binary against a mock LiveDNS API.
//!
//! The DDNS hostname is an IP literal so resolution never leaves the host.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use ddns_core::UpdaterConfig;
use mockito::{Matcher, Mock, ServerGuard};
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DDNS_IP: &str = "203.0.113.5";

fn cmd(config: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("ddns-updater");
    cmd.env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

fn write_config(dir: &TempDir, server: &ServerGuard, ip: &str, hosts: &[&str], extra: &str) -> PathBuf {
    let hosts = hosts
        .iter()
        .map(|h| format!("\"{}\"", h))
        .collect::<Vec<_>>()
        .join(", ");
    let raw = format!(
        r#"
[general]
version = 1
ddns_hostname = "{DDNS_IP}"
ip = "{ip}"

[gandi]
api_key = "test-api-key"
record_url_template = "{url}/v5/livedns/domains/{{host}}/records/%40/A"
hosts = [{hosts}]
timeout_secs = 5
{extra}
"#,
        url = server.url(),
    );

    let path = dir.path().join("dns_updater.toml");
    fs::write(&path, raw).unwrap();
    path
}

fn stored_ip(path: &Path) -> String {
    let config = UpdaterConfig::from_toml_str(&fs::read_to_string(path).unwrap()).unwrap();
    config.general.ip
}

fn record_mock(server: &mut ServerGuard, host: &str, status: usize) -> Mock {
    let path = format!("^/v5/livedns/domains/{}/records/", host.replace('.', r"\."));
    server
        .mock("PUT", Matcher::Regex(path))
        .match_header("authorization", "Apikey test-api-key")
        .match_body(Matcher::JsonString(format!(r#"{{"rrset_values":["{}"]}}"#, DDNS_IP)))
        .with_status(status)
        .create()
}

#[test]
fn missing_config_creates_template_and_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dns_updater.toml");

    cmd(&path)
        .assert()
        .code(1)
        .stderr(contains("template was created"));

    let template = fs::read_to_string(&path).unwrap();
    assert!(template.contains("YOUR_GANDI_API_KEY"));

    // The untouched template is still rejected
    cmd(&path)
        .assert()
        .code(1)
        .stderr(contains("placeholder"));
}

#[test]
fn unchanged_ip_exits_zero_without_api_calls() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("PUT", Matcher::Any).expect(0).create();
    let path = write_config(&dir, &server, DDNS_IP, &["a.example.org"], "");
    let before = fs::read_to_string(&path).unwrap();

    cmd(&path).assert().code(0);

    mock.assert();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn first_run_updates_every_host_and_persists() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let a = record_mock(&mut server, "a.example.org", 201);
    let b = record_mock(&mut server, "b.example.org", 201);
    let path = write_config(&dir, &server, "", &["a.example.org", "b.example.org"], "");

    cmd(&path).assert().code(0);

    a.assert();
    b.assert();
    assert_eq!(stored_ip(&path), DDNS_IP);
    assert!(dir.path().join("dns_updater.toml.backup").exists());
    assert!(!dir.path().join("dns_updater.toml.tmp").exists());

    // Second run finds nothing to do
    cmd(&path).assert().code(0);
    a.assert();
    b.assert();
}

#[test]
fn rejected_host_is_partial_failure_and_keeps_ip() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let a = record_mock(&mut server, "a.example.org", 403);
    let b = record_mock(&mut server, "b.example.org", 201);
    let path = write_config(
        &dir,
        &server,
        "198.51.100.7",
        &["a.example.org", "b.example.org"],
        "",
    );

    cmd(&path)
        .assert()
        .code(4)
        .stderr(contains("a.example.org"));

    a.assert();
    b.assert();
    assert_eq!(stored_ip(&path), "198.51.100.7");
}

#[test]
fn locked_config_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server.mock("PUT", Matcher::Any).expect(0).create();
    let path = write_config(&dir, &server, "", &["a.example.org"], "");

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let held = rt
        .block_on(ddns_core::FileConfigStore::open(&path))
        .unwrap();

    cmd(&path)
        .assert()
        .code(1)
        .stderr(contains("locked"));

    drop(held);
    mock.assert();
    assert_eq!(stored_ip(&path), "");
}

#[test]
fn invalid_log_level_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let server = mockito::Server::new();
    let path = write_config(&dir, &server, DDNS_IP, &["a.example.org"], "");

    cmd(&path)
        .args(["--log-level", "loud"])
        .assert()
        .code(1);
}

#[test]
fn log_file_is_relative_to_config() {
    let dir = TempDir::new().unwrap();
    let server = mockito::Server::new();
    let path = write_config(
        &dir,
        &server,
        DDNS_IP,
        &["a.example.org"],
        "\n[logging]\nlevel = \"info\"\nfile = \"updater.log\"\n",
    );

    cmd(&path).assert().code(0);

    let log = fs::read_to_string(dir.path().join("updater.log")).unwrap();
    assert!(log.contains("Run finished"));
    assert!(!log.contains("test-api-key"));
    assert!(!log.contains("\u{1b}["), "log file has no ANSI escapes");
}
