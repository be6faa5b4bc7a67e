//! Command-line surface: arguments, error categories and exit codes.
//!
//! Every run-time option also reads the matching GitHub Actions input
//! variable (`INPUT_<NAME>`), so the same binary serves as an action step.

use crate::tracing::{LogLevel, TracingFormat};
use clap::{ArgAction, Parser};
use miette::{Diagnostic, Report};
use resticup_core::{SetupPlan, VersionSpec};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// An installation pipeline failed
pub const EXIT_INSTALL: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(resticup::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// A tool could not be installed (exit code 1)
    #[error("Installation failed: {message}")]
    #[diagnostic(code(resticup::cli::install))]
    Install {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 1)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(resticup::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Every pipeline failure is an installation error; the core help text is kept.
impl From<resticup_core::Error> for CliError {
    fn from(err: resticup_core::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        Self::Install {
            message: err.to_string(),
            help,
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Install { .. } | CliError::Other { .. } => EXIT_INSTALL,
    }
}

/// JSON error envelope for `err`.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn error_json(err: &CliError) -> serde_json::Result<String> {
    let error_envelope = ErrorEnvelope::new(serde_json::json!({
        "code": match err {
            CliError::Config { .. } => "config",
            CliError::Install { .. } => "install",
            CliError::Other { .. } => "other",
        },
        "message": err.to_string()
    }));
    serde_json::to_string(&error_envelope)
}

/// Render error to stderr, as a miette report or a JSON envelope.
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        match error_json(err) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
    }
    let _ = io::stderr().flush();
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Parse an action boolean. Actions pass inputs as strings; an empty value
/// means the input was not set.
fn parse_bool_input(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected 'true' or 'false', got '{other}'")),
    }
}

/// Install restic and resticprofile release binaries.
#[derive(Parser, Debug)]
#[command(name = "resticup")]
#[command(about = "Install restic and resticprofile release binaries from GitHub")]
#[command(version)]
pub struct Cli {
    /// Install restic as well as resticprofile
    #[arg(
        long,
        env = "INPUT_INSTALL-RESTIC",
        default_value = "true",
        value_parser = parse_bool_input,
        action = ArgAction::Set,
        value_name = "BOOL"
    )]
    pub install_restic: bool,

    /// restic version to install (a tag such as v0.18.1, or "latest")
    #[arg(long, env = "INPUT_RESTIC-VERSION", default_value = "latest")]
    pub restic_version: String,

    /// resticprofile version to install (a tag such as v0.32.0, or "latest")
    #[arg(long, env = "INPUT_RESTICPROFILE-VERSION", default_value = "latest")]
    pub resticprofile_version: String,

    /// Directory the binaries are installed into [default: ~/.local/bin]
    #[arg(long, env = "INPUT_INSTALL-PATH")]
    pub install_path: Option<String>,

    /// Token for GitHub API requests (falls back to GH_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Directory for per-tool scratch space [default: system temp dir]
    #[arg(long, env = "RUNNER_TEMP")]
    pub work_dir: Option<String>,

    /// Set logging level
    #[arg(long, short = 'L', global = true, default_value = "info", value_enum)]
    pub level: LogLevel,

    /// Log output format
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    /// Emit JSON envelope format (for automation)
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    /// Build the setup plan from the parsed options.
    ///
    /// # Errors
    ///
    /// Fails when no install path was given and the home directory is unknown.
    pub fn plan(&self) -> Result<SetupPlan, CliError> {
        let plan = SetupPlan::new(
            VersionSpec::parse(&self.restic_version),
            VersionSpec::parse(&self.resticprofile_version),
            self.install_dir()?,
        );
        Ok(if self.install_restic {
            plan
        } else {
            plan.without_restic()
        })
    }

    /// Target directory for both binaries.
    ///
    /// A leading `~` is expanded because action inputs are not shell-expanded.
    ///
    /// # Errors
    ///
    /// Fails when the home directory is needed but cannot be determined.
    pub fn install_dir(&self) -> Result<PathBuf, CliError> {
        let requested = self
            .install_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        match requested {
            Some(path) => {
                if path == "~" {
                    home_dir()
                } else if let Some(rest) = path.strip_prefix("~/") {
                    Ok(home_dir()?.join(rest))
                } else {
                    Ok(PathBuf::from(path))
                }
            }
            None => Ok(home_dir()?.join(".local").join("bin")),
        }
    }

    /// Token for metadata queries, if any.
    #[must_use]
    pub fn github_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GH_TOKEN").ok().filter(|t| !t.is_empty()))
    }

    /// Scratch root, ignoring an empty value.
    #[must_use]
    pub fn work_root(&self) -> Option<PathBuf> {
        self.work_dir
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}

fn home_dir() -> Result<PathBuf, CliError> {
    dirs::home_dir().ok_or_else(|| {
        CliError::config_with_help(
            "Cannot determine the home directory",
            "Pass --install-path or set INPUT_INSTALL-PATH",
        )
    })
}

/// Parse command-line arguments and the environment.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
