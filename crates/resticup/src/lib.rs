//! resticup: install restic and resticprofile release binaries.
//!
//! The binary wires the GitHub transport from `resticup-tools-github` into
//! the pipeline of `resticup-core`, then reports step outputs the way a
//! GitHub Actions runner expects them.

pub mod cli;
pub mod outputs;
pub mod tracing;

use cli::{Cli, CliError};
use outputs::ActionOutputs;
use resticup_core::{
    Downloader, Orchestrator, ReleaseSource, SetupPlan, SetupReport, TracingSink,
};
use resticup_tools_github::GitHubClient;
use std::path::Path;

/// Run a setup with the options in `cli`.
///
/// Outputs are written only after every requested tool installed.
///
/// # Errors
///
/// Returns the first pipeline failure, or a configuration error.
pub async fn run(cli: &Cli) -> Result<SetupReport, CliError> {
    let plan = cli.plan()?;
    let client = GitHubClient::new()
        .map_err(|e| CliError::other(format!("Failed to build HTTP client: {e}")))?
        .with_token(cli.github_token());

    let report = execute(&plan, &client, &client, cli.work_root().as_deref()).await?;

    ActionOutputs::from_env()
        .write(&report, &plan.install_dir)
        .map_err(|e| {
            CliError::other_with_help(
                format!("Failed to write step outputs: {e}"),
                "Check that GITHUB_OUTPUT and GITHUB_PATH point to writable files",
            )
        })?;

    Ok(report)
}

/// Execute `plan` against the given transports, logging through `tracing`.
///
/// # Errors
///
/// Returns the first pipeline failure as [`CliError::Install`].
pub async fn execute(
    plan: &SetupPlan,
    source: &dyn ReleaseSource,
    downloader: &dyn Downloader,
    work_root: Option<&Path>,
) -> Result<SetupReport, CliError> {
    let sink = TracingSink;
    let mut orchestrator = Orchestrator::new(source, downloader, &sink);
    if let Some(dir) = work_root {
        orchestrator = orchestrator.with_work_root(dir);
    }
    Ok(orchestrator.run(plan).await?)
}
