//! End-to-end launch sessions against a local release feed.

mod common;

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use mockito::{Server, ServerGuard};
use tempfile::TempDir;

use common::{FakeProcesses, ScriptedUi};
use workspace_updater::{
    DownloadSettings, FeedSettings, HandoffMode, InstallerSettings, LaunchState, Launcher,
    LauncherSettings, UpdateError,
};

const FEED_PATH: &str = "/repos/wmtogether/chats/releases/latest";
const INSTALLER_SIZE: usize = 10_485_760;

struct Fixture {
    server: ServerGuard,
    app_dir: TempDir,
    download_dir: TempDir,
}

impl Fixture {
    fn new(local_version: &str) -> Self {
        let app_dir = tempfile::tempdir().unwrap();
        std::fs::write(app_dir.path().join("version.txt"), local_version).unwrap();
        std::fs::write(app_dir.path().join("workspace.exe"), b"").unwrap();

        Self {
            server: Server::new(),
            app_dir,
            download_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn settings(&self) -> LauncherSettings {
        LauncherSettings {
            main_executable: "workspace.exe".to_string(),
            feed: FeedSettings {
                api_base_url: self.server.url(),
                ..FeedSettings::default()
            },
            download: DownloadSettings {
                connect_timeout_secs: 5,
                directory: Some(self.download_dir.path().to_path_buf()),
                poll_interval_ms: 1,
                ..DownloadSettings::default()
            },
            installer: InstallerSettings {
                extension: ".exe".to_string(),
                helper_executable: "updater.exe".to_string(),
                launcher_process: "launcher.exe".to_string(),
                ..InstallerSettings::default()
            },
            ..LauncherSettings::default()
        }
    }

    fn feed(&mut self, tag: &str, assets: &[(&str, &str)]) -> mockito::Mock {
        let assets: Vec<String> = assets
            .iter()
            .map(|(name, url)| {
                format!(
                    r#"{{"name": "{name}", "browser_download_url": "{url}", "size": {INSTALLER_SIZE}}}"#
                )
            })
            .collect();
        let body = format!(
            r#"{{"tag_name": "{tag}", "assets": [{}]}}"#,
            assets.join(",")
        );
        self.server
            .mock("GET", FEED_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create()
    }

    fn app(&self, name: &str) -> std::path::PathBuf {
        self.app_dir.path().join(name)
    }

    fn installer(&self, name: &str) -> std::path::PathBuf {
        self.download_dir.path().join(name)
    }
}

fn assert_launched_main_app(processes: &FakeProcesses, app_dir: &Path) {
    let spawns = processes.spawns();
    assert_eq!(spawns.len(), 1, "unexpected spawns: {spawns:?}");
    assert_eq!(spawns[0].program, app_dir.join("workspace.exe"));
    assert_eq!(spawns[0].cwd.as_deref(), Some(app_dir));
}

#[test]
fn test_same_version_launches_app() {
    let mut fixture = Fixture::new("1.2.0\n");
    let feed = fixture.feed("v1.2.0", &[]);

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    feed.assert();
    assert_eq!(
        report.states,
        vec![
            LaunchState::Idle,
            LaunchState::CheckingVersion,
            LaunchState::NoUpdate,
            LaunchState::LaunchMainApp,
            LaunchState::Exit,
        ]
    );
    assert!(shown.shown().confirms.is_empty());
    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_accepted_update_downloads_and_hands_off() {
    let mut fixture = Fixture::new("1.2.0");
    let url = format!("{}/download/app-setup.exe", fixture.server.url());
    let _feed = fixture.feed("v1.3.0", &[("notes.txt", "unused"), ("app-setup.exe", url.as_str())]);
    let download = fixture
        .server
        .mock("GET", "/download/app-setup.exe")
        .with_status(200)
        .with_body(vec![0u8; INSTALLER_SIZE])
        .create();

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    download.assert();
    assert!(report.handed_off());
    assert_eq!(
        report.states[2..],
        [
            LaunchState::UpdateOffered,
            LaunchState::Downloading,
            LaunchState::DownloadSucceeded,
            LaunchState::HandoffSpawned,
            LaunchState::Exit,
        ]
    );

    let shown = shown.shown();
    assert_eq!(
        shown.confirms,
        vec![(
            "Update Available".to_string(),
            "A new version 1.3.0 is available.\nCurrent version: 1.2.0\n\nUpdate now?".to_string()
        )]
    );
    assert!(shown.errors.is_empty());
    assert_eq!(shown.determinate, vec![INSTALLER_SIZE as u64]);
    assert_eq!(shown.positions.last(), Some(&(INSTALLER_SIZE as u64)));
    assert!(shown.positions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(shown.statuses.last().unwrap(), "10.0 MB / 10.0 MB");
    assert!(
        shown
            .statuses
            .iter()
            .filter(|s| s.contains(" MB / "))
            .all(|s| s.ends_with(" MB / 10.0 MB"))
    );
    assert_eq!(shown.closed, 1);

    let installer = fixture.installer("app-setup.exe");
    assert_eq!(
        std::fs::metadata(&installer).unwrap().len(),
        INSTALLER_SIZE as u64
    );
    let spawns = processes.spawns();
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].program, installer);
    assert_eq!(spawns[0].args, vec!["/UPDATE", "/SILENT"]);
}

#[test]
fn test_helper_handoff_passes_launcher_pid() {
    let mut fixture = Fixture::new("1.2.0");
    let url = format!("{}/download/app-setup.exe", fixture.server.url());
    let _feed = fixture.feed("v1.3.0", &[("app-setup.exe", url.as_str())]);
    let _download = fixture
        .server
        .mock("GET", "/download/app-setup.exe")
        .with_status(200)
        .with_body("installer bytes")
        .create();

    let mut settings = fixture.settings();
    settings.installer.handoff = HandoffMode::Helper;

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);

    let report = Launcher::new(settings, fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    assert!(report.handed_off());
    let spawns = processes.spawns();
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].program, fixture.app("updater.exe"));
    assert_eq!(
        spawns[0].args,
        vec![
            "--wait-pid".to_string(),
            "4242".to_string(),
            "--process-name".to_string(),
            "launcher.exe".to_string(),
            "--".to_string(),
            fixture.installer("app-setup.exe").display().to_string(),
            "/UPDATE".to_string(),
            "/SILENT".to_string(),
        ]
    );
}

#[test]
fn test_feed_not_found_launches_app() {
    let mut fixture = Fixture::new("1.2.0");
    let _feed = fixture.server.mock("GET", FEED_PATH).with_status(404).create();

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    assert!(report.visited(LaunchState::NoUpdate));
    assert!(shown.shown().confirms.is_empty());
    assert!(shown.shown().errors.is_empty());
    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_missing_installer_asset_is_reported() {
    let mut fixture = Fixture::new("1.2.0");
    let _feed = fixture.feed("v1.3.0", &[("app.zip", "https://example.com/app.zip")]);

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    assert!(report.visited(LaunchState::NoInstaller));
    assert!(!report.visited(LaunchState::Downloading));
    assert_eq!(report.download, None);
    assert_eq!(
        shown.shown().errors,
        vec![(
            "Error".to_string(),
            "No installer (.exe) found in release.".to_string()
        )]
    );
    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_connection_reset_falls_back_to_app() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).unwrap();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000\r\n\r\n")
            .unwrap();
        stream.write_all(&[0u8; 10_000]).unwrap();
    });

    let mut fixture = Fixture::new("1.2.0");
    let url = format!("http://{addr}/app-setup.exe");
    let _feed = fixture.feed("v1.3.0", &[("app-setup.exe", url.as_str())]);

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();
    peer.join().unwrap();

    assert!(report.visited(LaunchState::DownloadFailed));
    assert!(!report.handed_off());

    let download = report.download.unwrap();
    assert!(download.completed);
    assert!(!download.success);
    assert!(!download.error.unwrap_or_default().is_empty());

    let shown = shown.shown();
    assert_eq!(shown.errors.len(), 1);
    assert_eq!(shown.errors[0].0, "Update Failed");
    assert!(shown.errors[0].1.starts_with("Could not download update.\n\n"));
    assert_eq!(shown.closed, 1);
    drop(shown);

    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_unknown_length_stays_indeterminate() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).unwrap();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n")
            .unwrap();
        stream.write_all(&[0u8; 300_000]).unwrap();
    });

    let mut fixture = Fixture::new("1.2.0");
    let url = format!("http://{addr}/app-setup.exe");
    let _feed = fixture.feed("v1.3.0", &[("app-setup.exe", url.as_str())]);

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();
    peer.join().unwrap();

    assert!(report.visited(LaunchState::DownloadSucceeded));
    assert!(report.handed_off());

    let download = report.download.unwrap();
    assert!(download.success);
    assert_eq!(download.total, 0);
    assert_eq!(download.downloaded, 300_000);

    let shown = shown.shown();
    assert!(shown.determinate.is_empty());
    assert!(shown.positions.is_empty());
    assert!(shown.errors.is_empty());
    assert_eq!(shown.statuses.last().unwrap(), "Downloaded 0.3 MB");
    assert_eq!(shown.closed, 1);
    drop(shown);

    let spawns = processes.spawns();
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].program, fixture.installer("app-setup.exe"));
}

#[test]
fn test_declined_update_launches_app() {
    let mut fixture = Fixture::new("1.2.0");
    let url = format!("{}/download/app-setup.exe", fixture.server.url());
    let _feed = fixture.feed("v1.3.0", &[("app-setup.exe", url.as_str())]);
    let download = fixture
        .server
        .mock("GET", "/download/app-setup.exe")
        .expect(0)
        .create();

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(false);

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    download.assert();
    assert!(report.visited(LaunchState::Declined));
    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_older_remote_tag_is_still_offered() {
    let mut fixture = Fixture::new("1.3.0");
    let _feed = fixture.feed("v1.2.0", &[]);

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(false);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    assert!(report.visited(LaunchState::UpdateOffered));
    assert_eq!(shown.shown().confirms.len(), 1);
}

#[test]
fn test_installer_spawn_failure_launches_app() {
    let mut fixture = Fixture::new("1.2.0");
    let url = format!("{}/download/app-setup.exe", fixture.server.url());
    let _feed = fixture.feed("v1.3.0", &[("app-setup.exe", url.as_str())]);
    let _download = fixture
        .server
        .mock("GET", "/download/app-setup.exe")
        .with_status(200)
        .with_body("installer bytes")
        .create();

    let processes = FakeProcesses::failing(fixture.installer("app-setup.exe"));
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .run()
        .unwrap();

    assert!(report.visited(LaunchState::HandoffFailed));
    assert!(!report.handed_off());
    assert_eq!(
        shown.shown().errors,
        vec![(
            "Update Failed".to_string(),
            "Failed to launch installer".to_string()
        )]
    );
    assert_launched_main_app(&processes, fixture.app_dir.path());
}

#[test]
fn test_missing_main_app_is_fatal() {
    let fixture = Fixture::new("1.2.0");
    std::fs::remove_file(fixture.app("workspace.exe")).unwrap();

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);
    let shown = ui.clone();

    let err = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .skip_update_check(true)
        .run()
        .unwrap_err();

    assert!(matches!(err, UpdateError::MainAppMissing(_)));
    assert!(err.is_fatal());
    assert_eq!(
        shown.shown().errors,
        vec![(
            "Error".to_string(),
            "Application not found:\nworkspace.exe".to_string()
        )]
    );
    assert!(processes.spawns().is_empty());
}

#[test]
fn test_skip_update_check_never_queries_feed() {
    let mut fixture = Fixture::new("1.2.0");
    let feed = fixture.server.mock("GET", FEED_PATH).expect(0).create();

    let processes = FakeProcesses::new();
    let mut ui = ScriptedUi::answering(true);

    let report = Launcher::new(fixture.settings(), fixture.app_dir.path(), &processes, &mut ui)
        .skip_update_check(true)
        .run()
        .unwrap();

    feed.assert();
    assert_eq!(
        report.states,
        vec![LaunchState::Idle, LaunchState::LaunchMainApp, LaunchState::Exit]
    );
    assert_launched_main_app(&processes, fixture.app_dir.path());
}
