//! Installer handoff helper for the Workspace launcher.
//!
//! The launcher cannot start an installer that replaces the launcher's own
//! executable while it is still running. Instead it spawns this helper and
//! exits. The helper:
//! 1. Waits for the launcher pid to exit
//! 2. Force-terminates anything still running under the launcher's name
//! 3. Waits for the process table to settle
//! 4. Starts the installer and exits without waiting for it
//!
//! Invoked as `updater [OPTIONS] [--] <INSTALLER> [ARGS...]`. The plain
//! positional form `updater <INSTALLER> [ARGS...]` is also accepted.

mod log;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use workspace_updater::{HelperPlan, SystemProcesses, run_helper};

#[derive(Parser, Debug)]
#[command(
    name = "updater",
    version,
    about = "Runs the Workspace installer once the launcher has exited"
)]
struct Args {
    /// Pid of the launcher to wait for.
    #[arg(long = "wait-pid", value_name = "PID")]
    wait_pid: Option<u32>,

    /// Process name to force-terminate before installing.
    #[arg(long = "process-name", value_name = "NAME", default_value_t = default_process_name())]
    process_name: String,

    /// Fallback delay when the launcher's exit cannot be observed.
    #[arg(long = "settle-delay-ms", value_name = "MS", default_value_t = 1000)]
    settle_delay_ms: u64,

    /// Upper bound on each wait.
    #[arg(long = "exit-timeout-secs", value_name = "SECS", default_value_t = 10)]
    exit_timeout_secs: u64,

    /// Installer to start.
    #[arg(value_name = "INSTALLER")]
    installer: PathBuf,

    /// Arguments passed through to the installer.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    installer_args: Vec<String>,
}

fn default_process_name() -> String {
    format!("launcher{}", std::env::consts::EXE_SUFFIX)
}

impl Args {
    fn into_plan(self) -> HelperPlan {
        HelperPlan {
            installer: self.installer,
            installer_args: self.installer_args,
            wait_pid: self.wait_pid,
            process_name: Some(self.process_name).filter(|name| !name.is_empty()),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            exit_timeout: Duration::from_secs(self.exit_timeout_secs),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(path) = log::init_logging() {
        tracing::info!("Log file: {}", path.display());
    }
    tracing::info!("Workspace update helper {} started", env!("CARGO_PKG_VERSION"));

    let plan = args.into_plan();
    tracing::debug!("Plan: {:?}", plan);

    match run_helper(&SystemProcesses::new(), &plan) {
        Ok(pid) => {
            tracing::info!("Installer started (pid {pid}), exiting");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("Failed to run installer: {error}");
            ExitCode::FAILURE
        }
    }
}
