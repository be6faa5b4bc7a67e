//! Binary-level tests and setup runs against fake transports.

use assert_cmd::Command;
use async_trait::async_trait;
use predicates::prelude::*;
use resticup::cli::{CliError, EXIT_CLI, EXIT_INSTALL, exit_code_for};
use resticup_core::{
    Downloader, Error, ReleaseMetadata, ReleaseSource, Result, SetupPlan, VersionSpec,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

const INPUT_VARS: [&str; 6] = [
    "INPUT_INSTALL-RESTIC",
    "INPUT_RESTIC-VERSION",
    "INPUT_RESTICPROFILE-VERSION",
    "INPUT_INSTALL-PATH",
    "GITHUB_OUTPUT",
    "GITHUB_PATH",
];

fn resticup() -> Command {
    let mut cmd = Command::cargo_bin("resticup").unwrap();
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_inputs() {
    resticup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--install-restic"))
        .stdout(predicate::str::contains("--restic-version"))
        .stdout(predicate::str::contains("--resticprofile-version"))
        .stdout(predicate::str::contains("--install-path"))
        .stdout(predicate::str::contains("INPUT_INSTALL-PATH"));
}

#[test]
fn test_version_flag() {
    resticup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_bool_input_is_usage_error() {
    resticup()
        .args(["--install-restic", "maybe"])
        .assert()
        .code(EXIT_CLI)
        .stderr(predicate::str::contains("expected 'true' or 'false'"));
}

#[test]
fn test_invalid_bool_from_env_is_usage_error() {
    resticup()
        .env("INPUT_INSTALL-RESTIC", "nope")
        .assert()
        .code(EXIT_CLI);
}

#[test]
fn test_unknown_log_format_rejected() {
    resticup()
        .args(["--log-format", "xml"])
        .assert()
        .code(EXIT_CLI)
        .stderr(predicate::str::contains("xml"));
}

/// Release source that always fails, recording queried repositories.
#[derive(Default)]
struct Unreachable {
    queried: Mutex<Vec<String>>,
}

#[async_trait]
impl ReleaseSource for Unreachable {
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<ReleaseMetadata> {
        self.queried.lock().unwrap().push(format!("{owner}/{repo}"));
        Err(Error::metadata_fetch(owner, repo, "HTTP 503 Service Unavailable"))
    }
}

#[async_trait]
impl Downloader for Unreachable {
    async fn download(&self, url: &str, _dest: &Path) -> Result<PathBuf> {
        Err(Error::download(url, "connection refused"))
    }
}

#[tokio::test]
async fn test_execute_maps_pipeline_failure() {
    let temp = TempDir::new().unwrap();
    let fake = Unreachable::default();
    let plan = SetupPlan::new(VersionSpec::Latest, VersionSpec::Latest, temp.path().join("bin"))
        .without_restic();

    let err = resticup::execute(&plan, &fake, &fake, Some(temp.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Install { .. }));
    assert_eq!(exit_code_for(&err), EXIT_INSTALL);
    assert!(err.to_string().contains("creativeprojects/resticprofile"));
    assert_eq!(
        *fake.queried.lock().unwrap(),
        vec!["creativeprojects/resticprofile".to_string()]
    );
    assert!(!temp.path().join("bin").exists());
}

#[tokio::test]
async fn test_execute_download_failure_names_url() {
    let temp = TempDir::new().unwrap();
    let fake = Unreachable::default();
    let plan = SetupPlan::new(
        VersionSpec::Tag("v0.18.1".into()),
        VersionSpec::Tag("v0.32.0".into()),
        temp.path().join("bin"),
    );

    let err = resticup::execute(&plan, &fake, &fake, Some(temp.path()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains(
        "https://github.com/restic/restic/releases/download/v0.18.1/restic_0.18.1_"
    ));
    assert!(fake.queried.lock().unwrap().is_empty());
}
