//! Run outputs: GitHub Actions output files and the stdout summary.

use crate::cli::OkEnvelope;
use resticup_core::{SetupReport, Tool};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output name reporting whether `tool` was installed.
#[must_use]
pub fn output_name(tool: Tool) -> String {
    format!("{}-installed", tool.name())
}

/// `(name, installed)` pairs in installation order.
#[must_use]
pub fn output_pairs(report: &SetupReport) -> Vec<(String, bool)> {
    Tool::ALL
        .into_iter()
        .map(|tool| (output_name(tool), report.installed(tool)))
        .collect()
}

/// Files the Actions runner reads back after the step.
#[derive(Debug, Clone, Default)]
pub struct ActionOutputs {
    output_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl ActionOutputs {
    /// Use explicit files; `None` skips that file.
    #[must_use]
    pub fn new(output_file: Option<PathBuf>, path_file: Option<PathBuf>) -> Self {
        Self {
            output_file,
            path_file,
        }
    }

    /// Read `GITHUB_OUTPUT` and `GITHUB_PATH`. Both are unset outside Actions.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self::new(var("GITHUB_OUTPUT"), var("GITHUB_PATH"))
    }

    /// Append the outputs of a successful run, and the install directory to
    /// the runner's PATH file.
    ///
    /// Both files are opened before either is written, so an unusable target
    /// leaves the other untouched.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the first file that could not be opened or
    /// appended to.
    pub fn write(&self, report: &SetupReport, install_dir: &Path) -> io::Result<()> {
        let output_file = self.output_file.as_deref().map(open_append).transpose()?;
        let path_file = self.path_file.as_deref().map(open_append).transpose()?;

        if let Some(mut file) = path_file {
            writeln!(file, "{}", install_dir.display())?;
            debug!(path = ?self.path_file, dir = ?install_dir, "Added install directory to PATH");
        }

        if let Some(mut file) = output_file {
            let mut lines = String::new();
            for (name, installed) in output_pairs(report) {
                lines.push_str(&format!("{name}={installed}\n"));
            }
            file.write_all(lines.as_bytes())?;
            debug!(path = ?self.output_file, "Wrote step outputs");
        }

        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// One tool in the JSON summary.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    /// Tool name.
    pub tool: &'static str,
    /// Whether the pipeline ran and succeeded.
    pub installed: bool,
    /// Installed tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Final binary location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// JSON payload printed on success in `--json` mode.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Platform the assets were selected for, as `os/arch`.
    pub platform: String,
    /// Step outputs keyed by output name.
    pub outputs: std::collections::BTreeMap<String, bool>,
    /// Per-tool detail.
    pub tools: Vec<ToolSummary>,
}

impl From<&SetupReport> for RunSummary {
    fn from(report: &SetupReport) -> Self {
        Self {
            platform: report.platform.to_string(),
            outputs: output_pairs(report).into_iter().collect(),
            tools: report
                .outcomes
                .iter()
                .map(|o| ToolSummary {
                    tool: o.tool.name(),
                    installed: o.installed,
                    version: o.version.as_ref().map(|v| v.tag().to_string()),
                    path: o.path.clone(),
                })
                .collect(),
        }
    }
}

/// Text printed on stdout after a successful run.
///
/// # Errors
///
/// Fails only if the JSON summary cannot be serialized.
pub fn render_report(report: &SetupReport, json_mode: bool) -> serde_json::Result<String> {
    if json_mode {
        serde_json::to_string(&OkEnvelope::new(RunSummary::from(report)))
    } else {
        Ok(output_pairs(report)
            .into_iter()
            .map(|(name, installed)| format!("{name}={installed}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
