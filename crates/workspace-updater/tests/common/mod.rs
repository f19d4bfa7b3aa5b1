//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use workspace_updater::{LauncherUi, ProcessControl, ProgressView, Result, UpdateError};

/// A spawn seen by [`FakeProcesses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawn {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Process control that records spawns and never touches the OS.
#[derive(Debug, Default)]
pub struct FakeProcesses {
    spawns: Mutex<Vec<Spawn>>,
    fail_program: Option<PathBuf>,
}

impl FakeProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make spawning `program` fail.
    pub fn failing(program: impl Into<PathBuf>) -> Self {
        Self {
            fail_program: Some(program.into()),
            ..Self::default()
        }
    }

    pub fn spawns(&self) -> Vec<Spawn> {
        self.spawns.lock().unwrap().clone()
    }
}

impl ProcessControl for FakeProcesses {
    fn spawn_detached(&self, program: &Path, args: &[String], cwd: Option<&Path>) -> Result<u32> {
        if self.fail_program.as_deref() == Some(program) {
            return Err(UpdateError::Spawn {
                program: program.display().to_string(),
                message: "access denied".to_string(),
            });
        }
        let mut spawns = self.spawns.lock().unwrap();
        spawns.push(Spawn {
            program: program.to_path_buf(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        });
        Ok(1000 + spawns.len() as u32)
    }

    fn is_running(&self, _pid: u32) -> bool {
        false
    }

    fn count_by_name(&self, _name: &str) -> usize {
        0
    }

    fn kill_by_name(&self, _name: &str) -> usize {
        0
    }

    fn current_pid(&self) -> u32 {
        4242
    }
}

/// Everything the session showed the user.
#[derive(Debug, Default)]
pub struct Shown {
    pub confirms: Vec<(String, String)>,
    pub errors: Vec<(String, String)>,
    pub progress_titles: Vec<String>,
    pub statuses: Vec<String>,
    pub determinate: Vec<u64>,
    pub positions: Vec<u64>,
    pub closed: usize,
}

/// UI that answers confirmations with a preset answer and records the rest.
#[derive(Debug, Clone)]
pub struct ScriptedUi {
    answer: bool,
    shown: Arc<Mutex<Shown>>,
}

impl ScriptedUi {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            shown: Arc::default(),
        }
    }

    pub fn shown(&self) -> std::sync::MutexGuard<'_, Shown> {
        self.shown.lock().unwrap()
    }
}

impl LauncherUi for ScriptedUi {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.shown()
            .confirms
            .push((title.to_string(), message.to_string()));
        self.answer
    }

    fn error(&mut self, title: &str, message: &str) {
        self.shown()
            .errors
            .push((title.to_string(), message.to_string()));
    }

    fn progress_view(&mut self, title: &str) -> Box<dyn ProgressView> {
        self.shown().progress_titles.push(title.to_string());
        Box::new(RecordingView {
            shown: Arc::clone(&self.shown),
        })
    }
}

struct RecordingView {
    shown: Arc<Mutex<Shown>>,
}

impl ProgressView for RecordingView {
    fn set_status(&mut self, status: &str) {
        self.shown.lock().unwrap().statuses.push(status.to_string());
    }

    fn switch_to_determinate(&mut self, total: u64) {
        self.shown.lock().unwrap().determinate.push(total);
    }

    fn set_position(&mut self, position: u64) {
        self.shown.lock().unwrap().positions.push(position);
    }

    fn close(&mut self) {
        self.shown.lock().unwrap().closed += 1;
    }
}
