//! Process-management capability.
//!
//! Everything the launcher and the helper do to other processes goes through
//! [`ProcessControl`]. Detached spawning is configured per platform:
//! - **Windows**: detached, in a new process group, no console
//! - **Unix**: in a new process group, so it outlives the launcher's session

use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessStatus, System};

use crate::error::{Result, UpdateError};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::configure_detached;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::configure_detached;

#[cfg(not(any(windows, unix)))]
fn configure_detached(_command: &mut Command) {}

/// Interval between process table polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn, inspect and terminate processes.
pub trait ProcessControl {
    /// Start `program` without waiting on it. Returns the child's pid.
    fn spawn_detached(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> Result<u32>;

    /// Whether a live process with this pid exists.
    fn is_running(&self, pid: u32) -> bool;

    /// Number of live processes with exactly this name.
    fn count_by_name(&self, name: &str) -> usize;

    /// Force-terminate every process with this name except the current one.
    ///
    /// Returns how many were signalled.
    fn kill_by_name(&self, name: &str) -> usize;

    /// Pid of the current process.
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    /// Block until `pid` is gone or `timeout` elapses. Returns `true` if it exited.
    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        poll_until(timeout, || !self.is_running(pid))
    }

    /// Block until no process named `name` is left or `timeout` elapses.
    fn wait_until_gone(&self, name: &str, timeout: Duration) -> bool {
        poll_until(timeout, || self.count_by_name(name) == 0)
    }
}

/// Polls `done` every [`POLL_INTERVAL`] until it holds or `timeout` elapses.
fn poll_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// [`ProcessControl`] backed by the OS process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcesses;

impl SystemProcesses {
    /// Create the system-backed implementation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn snapshot() -> System {
        let mut sys = System::new();
        sys.refresh_processes();
        sys
    }
}

fn is_live(status: ProcessStatus) -> bool {
    !matches!(status, ProcessStatus::Zombie | ProcessStatus::Dead)
}

impl ProcessControl for SystemProcesses {
    fn spawn_detached(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> Result<u32> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        configure_detached(&mut command);

        let child = command.spawn().map_err(|e| UpdateError::Spawn {
            program: program.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!(
            "Spawned {} (pid {}) with args {:?}",
            program.display(),
            child.id(),
            args
        );
        Ok(child.id())
    }

    fn is_running(&self, pid: u32) -> bool {
        Self::snapshot()
            .process(Pid::from_u32(pid))
            .is_some_and(|process| is_live(process.status()))
    }

    fn count_by_name(&self, name: &str) -> usize {
        Self::snapshot()
            .processes_by_exact_name(name)
            .filter(|process| is_live(process.status()))
            .count()
    }

    fn kill_by_name(&self, name: &str) -> usize {
        let current = Pid::from_u32(self.current_pid());
        let sys = Self::snapshot();

        let mut killed = 0;
        for process in sys.processes_by_exact_name(name) {
            if process.pid() == current || !is_live(process.status()) {
                continue;
            }
            if process.kill() {
                tracing::info!("Terminated {} (pid {})", name, process.pid());
                killed += 1;
            } else {
                tracing::warn!("Could not terminate {} (pid {})", name, process.pid());
            }
        }
        killed
    }
}
