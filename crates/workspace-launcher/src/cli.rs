//! CLI argument definitions for the launcher.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use workspace_updater::HandoffMode;

#[derive(Parser)]
#[command(
    name = "launcher",
    version,
    about = "Workspace launcher - checks for updates, then starts Workspace",
    long_about = "Checks the release feed for a different Workspace build.\n\n\
                  If one is found and accepted, downloads its installer and hands off to it.\n\
                  Otherwise starts the installed application."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Application directory (default: the launcher's own directory).
    #[arg(long = "app-dir", value_name = "DIR", global = true)]
    pub app_dir: Option<PathBuf>,

    /// Settings file (default: <APP_DIR>/launcher.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// The subcommand, defaulting to `run`.
    #[must_use]
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Check for an update, then start the application (default).
    Run(RunArgs),

    /// Report the local and latest versions without changing anything.
    Check,

    /// Print the effective settings as TOML.
    Config,
}

#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Start the application without checking for updates.
    #[arg(long = "skip-update-check")]
    pub skip_update_check: bool,

    /// Accept an offered update without asking.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Use the terminal instead of native dialogs.
    #[arg(long = "headless")]
    pub headless: bool,

    /// Override how control is passed to the installer.
    #[arg(long = "handoff", value_enum)]
    pub handoff: Option<HandoffArg>,
}

/// CLI handoff choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HandoffArg {
    Direct,
    Helper,
}

impl From<HandoffArg> for HandoffMode {
    fn from(arg: HandoffArg) -> Self {
        match arg {
            HandoffArg::Direct => Self::Direct,
            HandoffArg::Helper => Self::Helper,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
