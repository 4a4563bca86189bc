mod common;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::Path;
use std::process::{Command, Output};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mount_listing, projects_url};

// Integration tests for the gitlab-mirror binary
// These run the built executable against a mocked GitLab API

fn gitlab_mirror(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gitlab-mirror"))
        .args(args)
        .env("GITLAB_READ_API_TOKEN", "glpat-test")
        .output()
        .expect("Failed to execute gitlab-mirror")
}

fn write_config(dir: &TempDir, server: &MockServer, base: &Path) -> String {
    let config = dir.child("config.yml");
    config
        .write_str(&format!(
            "base_directory: \"{}\"\ngitlab:\n  url: \"{}\"\n  timeout: 5\n",
            base.display(),
            projects_url(server)
        ))
        .unwrap();
    config.path().to_string_lossy().into_owned()
}

#[test]
fn test_cli_help() {
    let output = gitlab_mirror(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("doctor"));
}

#[test]
fn test_cli_version() {
    let output = gitlab_mirror(&["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("gitlab-mirror"));
}

#[test]
fn test_invalid_command() {
    let output = gitlab_mirror(&["nonexistent-command"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error") || stderr.contains("unrecognized"));
}

#[test]
fn test_error_handling_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.child("invalid-config.yml");
    config_path.write_str("gitlab: [not, a, mapping").unwrap();

    let output = gitlab_mirror(&["--config", config_path.path().to_str().unwrap(), "sync"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parse") || stderr.contains("config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_unauthorized_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.child("mirror");
    base.create_dir_all().unwrap();
    let config = write_config(&temp_dir, &server, base.path());

    let output = gitlab_mirror(&["--config", &config, "sync"]);

    assert!(!output.status.success());
    assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_shows_derived_names() {
    let server = MockServer::start().await;
    mount_listing(&server, &[&["monitoring", "alpha"], &["beta"]]).await;
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.child("mirror");
    base.child("beta").create_dir_all().unwrap();
    let config = write_config(&temp_dir, &server, base.path());

    let output = gitlab_mirror(&["--config", &config, "list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Projects (2)"));
    assert!(stdout.contains("alpha"));
    assert!(stdout.contains("beta"));
    assert!(!stdout.contains("monitoring"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_status_lines_survive_warn_level() {
    let server = MockServer::start().await;
    mount_listing(&server, &[&["monitoring", "alpha"]]).await;
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.child("mirror");
    base.child("alpha").create_dir_all().unwrap();
    let config = temp_dir.child("config.yml");
    config
        .write_str(&format!(
            "base_directory: \"{}\"\ngitlab:\n  url: \"{}\"\n  timeout: 5\nlogging:\n  level: warn\n",
            base.path().display(),
            projects_url(&server)
        ))
        .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_gitlab-mirror"))
        .args(["--config", config.path().to_str().unwrap(), "sync"])
        .env("GITLAB_READ_API_TOKEN", "glpat-test")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute gitlab-mirror");

    // alpha is a plain directory, so the pull itself fails
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("alpha already exists, updating"), "stdout: {}", stdout);
    assert!(!stdout.contains("monitoring"));
}
