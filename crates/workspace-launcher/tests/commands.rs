//! Integration tests for the launcher subcommands.

use std::path::Path;
use std::sync::Mutex;

use mockito::Server;

use workspace_launcher::cli::{HandoffArg, RunArgs};
use workspace_launcher::commands::{run_check, run_launch_with};
use workspace_updater::{
    FeedSettings, HeadlessUi, LauncherSettings, ProcessControl, Result,
};

const FEED_PATH: &str = "/repos/wmtogether/chats/releases/latest";

#[derive(Default)]
struct Spawned(Mutex<Vec<String>>);

impl ProcessControl for Spawned {
    fn spawn_detached(&self, program: &Path, _args: &[String], _cwd: Option<&Path>) -> Result<u32> {
        self.0.lock().unwrap().push(program.display().to_string());
        Ok(1)
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
}

fn settings(api_base_url: String) -> LauncherSettings {
    LauncherSettings {
        main_executable: "workspace.exe".to_string(),
        feed: FeedSettings {
            api_base_url,
            ..FeedSettings::default()
        },
        ..LauncherSettings::default()
    }
}

#[test]
fn test_missing_app_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let args = RunArgs {
        skip_update_check: true,
        ..RunArgs::default()
    };
    let processes = Spawned::default();
    let mut ui = HeadlessUi::new(false).quiet();

    let code = run_launch_with(
        dir.path(),
        settings("http://127.0.0.1:9".to_string()),
        &args,
        &processes,
        &mut ui,
    );

    assert_eq!(code, 1);
    assert!(processes.0.lock().unwrap().is_empty());
}

#[test]
fn test_declined_update_exits_cleanly() {
    let mut server = Server::new();
    let _feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body(r#"{"tag_name": "v9.9.9", "assets": []}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("workspace.exe"), b"").unwrap();
    let args = RunArgs {
        handoff: Some(HandoffArg::Helper),
        ..RunArgs::default()
    };
    let processes = Spawned::default();
    let mut ui = HeadlessUi::new(false).quiet();

    let code = run_launch_with(dir.path(), settings(server.url()), &args, &processes, &mut ui);

    assert_eq!(code, 0);
    assert_eq!(
        *processes.0.lock().unwrap(),
        vec![dir.path().join("workspace.exe").display().to_string()]
    );
}

#[test]
fn test_check_reports_available_update() {
    let mut server = Server::new();
    let _feed = server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_body(r#"{"tag_name": "v1.3.0", "assets": []}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("version.txt"), "v1.2.0\n").unwrap();

    let summary = run_check(dir.path(), &settings(server.url())).unwrap();

    assert_eq!(summary.local, "1.2.0");
    assert_eq!(summary.latest.as_deref(), Some("v1.3.0"));
    assert!(summary.update_available);
}

#[test]
fn test_check_without_marker_or_feed() {
    let mut server = Server::new();
    let _feed = server.mock("GET", FEED_PATH).with_status(404).create();

    let dir = tempfile::tempdir().unwrap();
    let summary = run_check(dir.path(), &settings(server.url())).unwrap();

    assert_eq!(summary.local, "0.0.0");
    assert!(!summary.update_available);
    assert_eq!(summary.error.as_deref(), Some("HTTP 404"));
}
