//! The helper's side of a helper-mediated handoff.
//!
//! Sequence:
//! 1. Wait for the launcher pid to exit (bounded), or sleep the settle delay
//!    when no pid was passed
//! 2. Force-terminate anything still running under the launcher's name
//! 3. Wait for that name to leave the process table, sleeping the settle
//!    delay only if something is still listed
//! 4. Start the installer detached and exit without waiting on it

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::process::ProcessControl;

/// What the helper was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperPlan {
    /// Installer to start last.
    pub installer: PathBuf,
    /// Installer arguments, passed through untouched.
    pub installer_args: Vec<String>,
    /// Pid of the launcher that spawned the helper.
    pub wait_pid: Option<u32>,
    /// Process name to terminate before installing.
    pub process_name: Option<String>,
    /// Fallback delay when exit cannot be observed.
    pub settle_delay: Duration,
    /// Upper bound on each wait.
    pub exit_timeout: Duration,
}

/// Run the helper sequence. Returns the installer's pid.
pub fn run_helper(processes: &dyn ProcessControl, plan: &HelperPlan) -> Result<u32> {
    match plan.wait_pid {
        Some(pid) => {
            tracing::info!("Waiting for launcher (pid {pid}) to exit");
            if processes.wait_for_exit(pid, plan.exit_timeout) {
                tracing::info!("Launcher exited");
            } else {
                tracing::warn!(
                    "Launcher still running after {:?}, continuing",
                    plan.exit_timeout
                );
            }
        }
        None => {
            tracing::info!("No launcher pid given, waiting {:?}", plan.settle_delay);
            thread::sleep(plan.settle_delay);
        }
    }

    if let Some(name) = plan.process_name.as_deref() {
        let killed = processes.kill_by_name(name);
        if killed > 0 {
            tracing::info!("Terminated {killed} lingering {name} process(es)");
        }

        if !processes.wait_until_gone(name, plan.exit_timeout) {
            tracing::warn!(
                "{name} still listed after {:?}, waiting {:?}",
                plan.exit_timeout,
                plan.settle_delay
            );
            thread::sleep(plan.settle_delay);
        }
    }

    tracing::info!(
        "Starting installer {} {:?}",
        plan.installer.display(),
        plan.installer_args
    );
    processes.spawn_detached(&plan.installer, &plan.installer_args, None)
}
