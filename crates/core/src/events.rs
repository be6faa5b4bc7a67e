//! Structured pipeline events.
//!
//! Components report progress through an [`EventSink`] handed to them rather
//! than a process-wide logger. [`TracingSink`] forwards events to `tracing`;
//! [`MemorySink`] records them for assertions.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::platform::Platform;
use crate::tool::Tool;

/// Tracing target for install events.
pub const EVENT_TARGET: &str = "resticup::install";

/// Pipeline stage of a single tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Turning the requested version into a release tag.
    Resolving,
    /// Fetching the release asset.
    Downloading,
    /// Unpacking the executable from the asset.
    Extracting,
    /// Moving the executable to the install directory.
    Installing,
}

impl Stage {
    /// Lowercase stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Extracting => "extracting",
            Self::Installing => "installing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened while installing a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallEvent {
    /// Platform detected; tools are about to run.
    SetupStarted {
        /// Platform assets are selected for.
        platform: Platform,
        /// Target directory of every binary.
        install_dir: PathBuf,
    },
    /// A tool entered a pipeline stage.
    StageEntered {
        /// Tool being installed.
        tool: Tool,
        /// Stage just entered.
        stage: Stage,
        /// Version, URL or path the stage works on.
        subject: String,
    },
    /// A tool was not requested and its pipeline did not run.
    ToolSkipped {
        /// Tool left untouched.
        tool: Tool,
    },
    /// A tool finished installing.
    ToolInstalled {
        /// Tool installed.
        tool: Tool,
        /// Installed tag.
        version: String,
        /// Final binary location.
        path: PathBuf,
    },
    /// A tool's pipeline aborted.
    ToolFailed {
        /// Tool that failed.
        tool: Tool,
        /// Stage the failure happened in.
        stage: Stage,
        /// Rendered error.
        error: String,
    },
    /// Low-level progress reported by a stage's component.
    Detail {
        /// Stage the component serves.
        stage: Stage,
        /// Human-readable progress note.
        message: String,
    },
}

/// Receives pipeline events.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: InstallEvent);
}

/// Forwards events to `tracing` under [`EVENT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: InstallEvent) {
        match event {
            InstallEvent::SetupStarted {
                platform,
                install_dir,
            } => tracing::info!(
                target: EVENT_TARGET,
                event_type = "setup.started",
                %platform,
                install_dir = %install_dir.display(),
                "Installing for {platform} into {}", install_dir.display()
            ),
            InstallEvent::StageEntered {
                tool,
                stage,
                subject,
            } => tracing::info!(
                target: EVENT_TARGET,
                event_type = "tool.stage",
                %tool,
                %stage,
                %subject,
                "{tool}: {stage} {subject}"
            ),
            InstallEvent::ToolSkipped { tool } => tracing::info!(
                target: EVENT_TARGET,
                event_type = "tool.skipped",
                %tool,
                "{tool}: installation not requested"
            ),
            InstallEvent::ToolInstalled {
                tool,
                version,
                path,
            } => tracing::info!(
                target: EVENT_TARGET,
                event_type = "tool.installed",
                %tool,
                %version,
                path = %path.display(),
                "{tool} {version} installed to {}", path.display()
            ),
            InstallEvent::ToolFailed { tool, stage, error } => tracing::error!(
                target: EVENT_TARGET,
                event_type = "tool.failed",
                %tool,
                %stage,
                %error,
                "{tool}: {stage} failed"
            ),
            InstallEvent::Detail { stage, message } => tracing::debug!(
                target: EVENT_TARGET,
                event_type = "stage.detail",
                %stage,
                "{message}"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<InstallEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<InstallEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stages entered by `tool`, in order.
    #[must_use]
    pub fn stages_of(&self, tool: Tool) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InstallEvent::StageEntered { tool: t, stage, .. } if t == tool => Some(stage),
                _ => None,
            })
            .collect()
    }

    /// Detail messages reported during `stage`, in order.
    #[must_use]
    pub fn details_of(&self, stage: Stage) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InstallEvent::Detail { stage: s, message } if s == stage => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: InstallEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
