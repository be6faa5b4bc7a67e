//! Setup orchestrator.
//!
//! Runs the acquisition pipeline (resolve, download, extract, install) for
//! each tool in [`Tool::ALL`] order. The first failure aborts the run.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::events::{EventSink, InstallEvent, Stage};
use crate::extract::extractor_for;
use crate::fetch::Downloader;
use crate::install::install_binary;
use crate::locate::locate;
use crate::platform::Platform;
use crate::tool::Tool;
use crate::version::{ReleaseSource, ResolvedVersion, VersionResolver, VersionSpec};
use crate::{Error, Result};

/// Whether a tool's pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    /// Install the given version.
    Requested(VersionSpec),
    /// Do not touch this tool.
    Skipped,
}

/// What a setup run should install, and where.
#[derive(Debug, Clone)]
pub struct SetupPlan {
    /// restic is optional.
    pub restic: ToolRequest,
    /// resticprofile is always installed.
    pub resticprofile: VersionSpec,
    /// Directory both binaries are installed into.
    pub install_dir: PathBuf,
}

impl SetupPlan {
    /// Create a plan installing both tools.
    #[must_use]
    pub fn new(
        restic: VersionSpec,
        resticprofile: VersionSpec,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            restic: ToolRequest::Requested(restic),
            resticprofile,
            install_dir: install_dir.into(),
        }
    }

    /// Skip restic.
    #[must_use]
    pub fn without_restic(mut self) -> Self {
        self.restic = ToolRequest::Skipped;
        self
    }

    /// Request for `tool` under this plan.
    #[must_use]
    pub fn request_for(&self, tool: Tool) -> ToolRequest {
        match tool {
            Tool::Restic => self.restic.clone(),
            Tool::Resticprofile => ToolRequest::Requested(self.resticprofile.clone()),
        }
    }
}

/// Terminal record of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Tool this outcome belongs to.
    pub tool: Tool,
    /// `false` when the tool was skipped.
    pub installed: bool,
    /// Tag that was installed.
    pub version: Option<ResolvedVersion>,
    /// Where the binary now lives.
    pub path: Option<PathBuf>,
}

impl InstallOutcome {
    fn skipped(tool: Tool) -> Self {
        Self {
            tool,
            installed: false,
            version: None,
            path: None,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SetupReport {
    /// Platform assets were selected for.
    pub platform: Platform,
    /// One outcome per tool, in installation order.
    pub outcomes: Vec<InstallOutcome>,
}

impl SetupReport {
    /// Outcome of `tool`.
    #[must_use]
    pub fn outcome(&self, tool: Tool) -> Option<&InstallOutcome> {
        self.outcomes.iter().find(|o| o.tool == tool)
    }

    /// Whether `tool` was installed.
    #[must_use]
    pub fn installed(&self, tool: Tool) -> bool {
        self.outcome(tool).is_some_and(|o| o.installed)
    }
}

/// Sequences the pipeline for every tool of a [`SetupPlan`].
pub struct Orchestrator<'a> {
    source: &'a dyn ReleaseSource,
    downloader: &'a dyn Downloader,
    events: &'a dyn EventSink,
    host_os: String,
    host_arch: String,
    work_root: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator for the running host.
    #[must_use]
    pub fn new(
        source: &'a dyn ReleaseSource,
        downloader: &'a dyn Downloader,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            source,
            downloader,
            events,
            host_os: std::env::consts::OS.to_string(),
            host_arch: std::env::consts::ARCH.to_string(),
            work_root: None,
        }
    }

    /// Override the host identifiers used for platform detection.
    #[must_use]
    pub fn with_host(mut self, os: impl Into<String>, arch: impl Into<String>) -> Self {
        self.host_os = os.into();
        self.host_arch = arch.into();
        self
    }

    /// Create per-tool scratch directories under `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_work_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_root = Some(dir.into());
        self
    }

    /// Execute `plan`.
    ///
    /// The platform is detected before any network access. Tools run strictly
    /// in sequence; the first error is returned and later tools are not
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] for an unknown host, otherwise
    /// the first error raised by any tool's pipeline.
    pub async fn run(&self, plan: &SetupPlan) -> Result<SetupReport> {
        let platform = Platform::from_host(&self.host_os, &self.host_arch)?;
        self.events.emit(InstallEvent::SetupStarted {
            platform,
            install_dir: plan.install_dir.clone(),
        });

        let mut outcomes = Vec::with_capacity(Tool::ALL.len());
        for tool in Tool::ALL {
            let outcome = match plan.request_for(tool) {
                ToolRequest::Skipped => {
                    self.events.emit(InstallEvent::ToolSkipped { tool });
                    InstallOutcome::skipped(tool)
                }
                ToolRequest::Requested(spec) => {
                    self.install_tool(tool, &spec, &platform, &plan.install_dir)
                        .await?
                }
            };
            outcomes.push(outcome);
        }

        Ok(SetupReport { platform, outcomes })
    }

    async fn install_tool(
        &self,
        tool: Tool,
        spec: &VersionSpec,
        platform: &Platform,
        install_dir: &Path,
    ) -> Result<InstallOutcome> {
        let mut stage = Stage::Resolving;
        match self
            .run_stages(tool, spec, platform, install_dir, &mut stage)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.events.emit(InstallEvent::ToolFailed {
                    tool,
                    stage,
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        tool: Tool,
        spec: &VersionSpec,
        platform: &Platform,
        install_dir: &Path,
        stage: &mut Stage,
    ) -> Result<InstallOutcome> {
        let identity = tool.identity();
        let binary_name = platform.executable_name(identity.binary);

        self.enter(tool, stage, Stage::Resolving, spec.to_string());
        let version = VersionResolver::new(self.source, self.events)
            .resolve(identity.owner, identity.repo, spec)
            .await?;

        let asset = locate(identity, &version, platform);
        self.enter(tool, stage, Stage::Downloading, asset.url.clone());
        // Removed when dropped, on success and on every error path.
        let work_dir = self
            .scratch_dir(tool)
            .map_err(|e| {
                Error::download(&asset.url, format!("cannot create work directory: {e}"))
            })?;
        let archive = self
            .downloader
            .download(&asset.url, &work_dir.path().join(&asset.file_name))
            .await?;

        self.enter(tool, stage, Stage::Extracting, archive.display().to_string());
        let binary = extractor_for(identity.archive).extract_binary(
            &archive,
            work_dir.path(),
            &binary_name,
            self.events,
        )?;

        self.enter(tool, stage, Stage::Installing, install_dir.display().to_string());
        let path = install_binary(&binary, install_dir, &binary_name, self.events)?;

        self.events.emit(InstallEvent::ToolInstalled {
            tool,
            version: version.to_string(),
            path: path.clone(),
        });

        Ok(InstallOutcome {
            tool,
            installed: true,
            version: Some(version),
            path: Some(path),
        })
    }

    fn enter(&self, tool: Tool, current: &mut Stage, next: Stage, subject: String) {
        *current = next;
        self.events.emit(InstallEvent::StageEntered {
            tool,
            stage: next,
            subject,
        });
    }

    fn scratch_dir(&self, tool: Tool) -> std::io::Result<TempDir> {
        let prefix = format!("resticup-{tool}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.work_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        self.events.emit(InstallEvent::Detail {
            stage: Stage::Downloading,
            message: format!("{tool} work directory {}", dir.path().display()),
        });
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_requests() {
        let plan = SetupPlan::new(
            VersionSpec::parse("v0.18.1"),
            VersionSpec::Latest,
            "/usr/local/bin",
        );
        assert_eq!(
            plan.request_for(Tool::Restic),
            ToolRequest::Requested(VersionSpec::Tag("v0.18.1".into()))
        );
        assert_eq!(
            plan.request_for(Tool::Resticprofile),
            ToolRequest::Requested(VersionSpec::Latest)
        );
    }

    #[test]
    fn test_plan_without_restic_still_installs_resticprofile() {
        let plan =
            SetupPlan::new(VersionSpec::Latest, VersionSpec::Latest, "/bin").without_restic();
        assert_eq!(plan.request_for(Tool::Restic), ToolRequest::Skipped);
        assert!(matches!(
            plan.request_for(Tool::Resticprofile),
            ToolRequest::Requested(_)
        ));
    }

    #[test]
    fn test_report_lookup() {
        let report = SetupReport {
            platform: Platform::from_host("linux", "x86_64").unwrap(),
            outcomes: vec![
                InstallOutcome::skipped(Tool::Restic),
                InstallOutcome {
                    tool: Tool::Resticprofile,
                    installed: true,
                    version: Some(ResolvedVersion::normalize("0.32.0")),
                    path: Some(PathBuf::from("/bin/resticprofile")),
                },
            ],
        };
        assert!(!report.installed(Tool::Restic));
        assert!(report.installed(Tool::Resticprofile));
    }
}
