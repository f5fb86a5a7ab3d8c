//! Integration tests for the device workflows
//!
//! Drives [`Engine`] end to end with a scripted adb and a real settings file.

use std::path::{Path, PathBuf};

use adeploy_adb::test_utils::FakeRunner;
use adeploy_app::{BuildCompleted, CommandOutcome, DeployReport, Engine, SettingsStore};
use tempfile::TempDir;

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            temp: tempfile::tempdir().unwrap(),
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.temp.path().join("adeploy").join("settings.json")
    }

    fn artifact(&self) -> PathBuf {
        let path = self.temp.path().join("Builds").join("game.apk");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"apk").unwrap();
        path
    }

    fn engine(&self, runner: FakeRunner) -> Engine<FakeRunner> {
        Engine::new(runner, SettingsStore::load(self.settings_path()))
    }
}

fn scripted_adb() -> FakeRunner {
    let runner = FakeRunner::new();
    runner
        .respond(
            "pair",
            CommandOutcome::success("Successfully paired to 192.168.1.20:37099 [guid=adb-R3CT-x]"),
        )
        .respond("connect", CommandOutcome::success("connected to 192.168.1.20:5555"))
        .respond(
            "devices",
            CommandOutcome::success("List of devices attached\n192.168.1.20:5555\tdevice\n"),
        )
        .respond("install", CommandOutcome::success("Performing Streamed Install\nSuccess"))
        .respond("monkey", CommandOutcome::success("Events injected: 1"));
    runner
}

fn build_event(artifact: &Path) -> BuildCompleted {
    BuildCompleted {
        output_path: artifact.to_path_buf(),
        succeeded: true,
        platform: "Android".to_string(),
        application_id: Some("com.defaultcompany.MyGameTitle".to_string()),
    }
}

#[tokio::test]
async fn test_pair_connect_then_auto_deploy_in_new_session() {
    let workspace = Workspace::new();

    // First session: pair, connect, enable auto-deploy
    {
        let mut engine = workspace.engine(scripted_adb());
        assert!(engine.pair("192.168.1.20", 37099, "482913").await.success);
        assert_eq!(engine.settings().connect_address, "192.168.1.20");

        assert!(engine.connect("192.168.1.20", 5555).await.success);
        engine.set_auto_deploy(true);
        engine.shutdown();
    }

    // Second session: the build pipeline reports a finished build
    let artifact = workspace.artifact();
    let mut engine = workspace.engine(scripted_adb());
    assert_eq!(engine.settings().devices.len(), 1);

    let report = engine
        .auto_deploy_on_build_complete(&build_event(&artifact))
        .await;

    assert_eq!(
        report,
        DeployReport::Deployed {
            serial: "192.168.1.20:5555".to_string(),
            package: "com.defaultcompany.MyGameTitle".to_string(),
        }
    );

    let calls = engine.runner().calls();
    assert_eq!(calls[0], "connect 192.168.1.20:5555");
    assert_eq!(
        calls[1],
        format!("-s 192.168.1.20:5555 install -r -d -g {}", artifact.display())
    );
    assert_eq!(
        calls[2],
        "-s 192.168.1.20:5555 shell monkey -p com.defaultcompany.MyGameTitle -c android.intent.category.LAUNCHER 1"
    );

    let saved = SettingsStore::load(workspace.settings_path());
    assert_eq!(saved.settings().last_artifact_path, Some(artifact));
}

#[tokio::test]
async fn test_auto_deploy_preconditions_never_touch_adb() {
    let workspace = Workspace::new();
    let artifact = workspace.artifact();

    // Auto-deploy on but nothing saved yet
    let mut engine = workspace.engine(scripted_adb());
    engine.set_auto_deploy(true);
    let report = engine
        .auto_deploy_on_build_complete(&build_event(&artifact))
        .await;
    assert!(matches!(report, DeployReport::Skipped { .. }));
    assert!(engine.runner().calls().is_empty());

    // Device saved but auto-deploy off
    engine.store_mut().record_connection("Glasses", "192.168.1.20", 5555);
    engine.set_auto_deploy(false);
    let report = engine
        .auto_deploy_on_build_complete(&build_event(&artifact))
        .await;
    assert!(matches!(report, DeployReport::Skipped { .. }));
    assert!(engine.runner().calls().is_empty());

    // Enabled, but the build failed
    engine.set_auto_deploy(true);
    let mut failed = build_event(&artifact);
    failed.succeeded = false;
    let report = engine.auto_deploy_on_build_complete(&failed).await;
    assert!(matches!(report, DeployReport::Skipped { .. }));
    assert!(engine.runner().calls().is_empty());
}

#[tokio::test]
async fn test_reconnect_updates_single_registry_record() {
    let workspace = Workspace::new();
    let runner = FakeRunner::new();
    runner.respond("connect", CommandOutcome::success("already connected to 192.168.1.20"));

    let mut engine = workspace.engine(runner);
    engine.connect("192.168.1.20", 5555).await;
    engine.rename_device("192.168.1.20", "Desk glasses");
    engine.connect("192.168.1.20", 41877).await;

    let saved = SettingsStore::load(workspace.settings_path());
    let registry = saved.registry();
    assert_eq!(registry.len(), 1);
    let record = registry.find("192.168.1.20").unwrap();
    assert_eq!(record.port, 41877);
    assert_eq!(record.name, "Desk glasses");
    assert!(record.last_connected_at().is_some());
}

#[tokio::test]
async fn test_corrupt_settings_start_fresh() {
    let workspace = Workspace::new();
    let path = workspace.settings_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "devices: [oops").unwrap();

    let mut engine = workspace.engine(scripted_adb());
    assert!(engine.settings().devices.is_empty());

    let candidates = engine.scan().await;
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].origin.live);
    assert!(!candidates[0].origin.from_registry);
}
