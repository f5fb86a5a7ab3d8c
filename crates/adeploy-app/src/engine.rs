//! Engine - owns the settings store, connection state and caches
//!
//! Front ends drive the workflows through [`Engine`]: every operation is an
//! `async fn` returning a result value, so the caller decides ordering. The
//! runner is held behind an [`Arc`] so callers can clone it into independent
//! tasks (e.g. a background scan) while the engine keeps working.

use std::path::Path;
use std::sync::Arc;

use adeploy_adb::CommandRunner;
use adeploy_core::prelude::*;
use adeploy_core::{AppRecord, CandidateDevice, ConnectionState, OperationResult};

use crate::config::{Settings, SettingsStore};
use crate::connection::ConnectionWorkflow;
use crate::deploy::{self, InstallOptions};
use crate::discovery;
use crate::inventory::AppInventory;

pub struct Engine<R: CommandRunner> {
    runner: Arc<R>,
    store: SettingsStore,
    connection: ConnectionWorkflow,
    inventory: AppInventory,
    candidates: Vec<CandidateDevice>,
}

impl<R: CommandRunner> Engine<R> {
    pub fn new(runner: R, store: SettingsStore) -> Self {
        Self {
            runner: Arc::new(runner),
            store,
            connection: ConnectionWorkflow::new(),
            inventory: AppInventory::default(),
            candidates: Vec::new(),
        }
    }

    pub fn runner(&self) -> &Arc<R> {
        &self.runner
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore {
        &mut self.store
    }

    pub fn state(&self) -> &ConnectionState {
        self.connection.state()
    }

    /// Candidates from the most recent scan (or disconnect)
    pub fn candidates(&self) -> &[CandidateDevice] {
        &self.candidates
    }

    pub fn inventory(&self) -> &AppInventory {
        &self.inventory
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Devices
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn scan(&mut self) -> &[CandidateDevice] {
        self.candidates = discovery::scan(&*self.runner, self.store.registry()).await;
        &self.candidates
    }

    pub async fn pair(&mut self, address: &str, port: u16, code: &str) -> OperationResult {
        self.connection
            .pair(&*self.runner, &mut self.store, address, port, code)
            .await
    }

    pub async fn connect(&mut self, address: &str, port: u16) -> OperationResult {
        let result = self
            .connection
            .connect(&*self.runner, &mut self.store, address, port)
            .await;
        if result.success {
            // Cached apps belong to whichever device was active before
            self.inventory.clear();
        }
        result
    }

    /// Pick up a connection the adb server already holds
    pub fn adopt_connection(&mut self, serial: &str) {
        debug!("Adopting existing connection {}", serial);
        self.connection.adopt(serial);
    }

    pub async fn disconnect(&mut self) -> &[CandidateDevice] {
        self.candidates = self
            .connection
            .disconnect(&*self.runner, &self.store, &mut self.inventory)
            .await;
        &self.candidates
    }

    /// Remove a device from the registry
    pub fn forget_device(&mut self, address: &str) -> usize {
        let removed = self.store.forget_device(address);
        self.candidates
            .retain(|c| !(c.address == address && !c.origin.live));
        for candidate in self.candidates.iter_mut().filter(|c| c.address == address) {
            candidate.origin.from_registry = false;
        }
        removed
    }

    /// Give a saved device a friendlier label
    pub fn rename_device(&mut self, address: &str, name: &str) -> bool {
        let mut renamed = false;
        self.store
            .update(|s| renamed = s.devices.rename(address, name));
        renamed
    }

    /// Serial to target: explicit choice, then the active connection, then
    /// the most recently connected saved device
    pub fn target_serial(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.state().serial().map(str::to_string))
            .or_else(|| self.store.registry().most_recent().map(|r| r.serial()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deploy
    // ─────────────────────────────────────────────────────────────────────────

    /// Install `artifact`; a successful install makes it the last artifact
    pub async fn install(
        &mut self,
        serial: &str,
        artifact: &Path,
        options: InstallOptions,
    ) -> OperationResult {
        let result = deploy::install(&*self.runner, serial, artifact, options).await;
        if result.success && self.settings().last_artifact_path.as_deref() != Some(artifact) {
            let path = artifact.to_path_buf();
            self.store.update(|s| s.last_artifact_path = Some(path));
        }
        result
    }

    pub async fn uninstall(&mut self, serial: &str, package: &str) -> OperationResult {
        deploy::uninstall(&*self.runner, serial, package).await
    }

    pub async fn launch(&self, serial: &str, package: &str) -> OperationResult {
        deploy::launch_app(&*self.runner, serial, package).await
    }

    pub async fn stop(&self, serial: &str, package: &str) -> OperationResult {
        deploy::stop_app(&*self.runner, serial, package).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Apps
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn refresh_apps(&mut self, serial: &str) -> OperationResult {
        self.inventory.refresh(&*self.runner, serial).await
    }

    pub async fn uninstall_app(&mut self, serial: &str, record: &AppRecord) -> OperationResult {
        self.inventory
            .uninstall_selected(&*self.runner, serial, record)
            .await
    }

    /// Apps filtered by the persisted show-all flag
    pub fn visible_apps(&self) -> Vec<AppRecord> {
        self.inventory.apply_filter(self.settings().show_all_apps)
    }

    pub fn set_show_all_apps(&mut self, show_all: bool) {
        self.store.update(|s| s.show_all_apps = show_all);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auto-deploy toggle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_auto_deploy(&mut self, enabled: bool) {
        info!(
            "Auto-deploy after build {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.store.update(|s| s.auto_deploy_after_build = enabled);
    }

    /// Flip the auto-deploy flag; returns the new value
    pub fn toggle_auto_deploy(&mut self) -> bool {
        let enabled = !self.settings().auto_deploy_after_build;
        self.set_auto_deploy(enabled);
        enabled
    }

    /// Flush settings before exit
    pub fn shutdown(&self) {
        debug!("Engine shutting down, flushing settings");
        self.store.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adeploy_adb::test_utils::FakeRunner;
    use adeploy_adb::CommandOutcome;
    use tempfile::TempDir;

    fn engine(runner: FakeRunner) -> (TempDir, Engine<FakeRunner>) {
        let temp = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(temp.path().join("settings.json"));
        (temp, Engine::new(runner, store))
    }

    #[tokio::test]
    async fn test_connect_then_scan_marks_saved_device_live() {
        let runner = FakeRunner::new();
        runner
            .respond("connect", CommandOutcome::success("connected to 10.0.0.5:5555"))
            .respond(
                "devices",
                CommandOutcome::success("List of devices attached\n10.0.0.5:5555\tdevice"),
            );
        let (_temp, mut engine) = engine(runner);

        assert!(engine.connect("10.0.0.5", 5555).await.success);
        let candidates = engine.scan().await;

        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].origin.from_registry);
        assert!(candidates[0].origin.live);
        assert_eq!(candidates[0].name, "10.0.0.5");
    }

    #[tokio::test]
    async fn test_target_serial_precedence() {
        let runner = FakeRunner::new();
        runner.respond("connect", CommandOutcome::success("connected"));
        let (_temp, mut engine) = engine(runner);

        assert_eq!(engine.target_serial(None), None);

        engine.store_mut().record_connection("Old", "10.0.0.1", 5555);
        assert_eq!(engine.target_serial(None).as_deref(), Some("10.0.0.1:5555"));

        engine.connect("10.0.0.2", 40000).await;
        assert_eq!(engine.target_serial(None).as_deref(), Some("10.0.0.2:40000"));
        assert_eq!(
            engine.target_serial(Some("emulator-5554")).as_deref(),
            Some("emulator-5554")
        );
        assert_eq!(engine.target_serial(Some("  ")).as_deref(), Some("10.0.0.2:40000"));
    }

    #[tokio::test]
    async fn test_install_remembers_artifact() {
        let runner = FakeRunner::new();
        runner.respond("install", CommandOutcome::success("Success"));
        let (temp, mut engine) = engine(runner);
        let artifact = temp.path().join("game.apk");
        std::fs::write(&artifact, b"apk").unwrap();

        let result = engine
            .install("10.0.0.5:5555", &artifact, InstallOptions::default())
            .await;

        assert!(result.success);
        let reloaded = SettingsStore::load(engine.store().path());
        assert_eq!(reloaded.settings().last_artifact_path, Some(artifact));
    }

    #[tokio::test]
    async fn test_failed_install_keeps_last_artifact() {
        let runner = FakeRunner::new();
        runner.respond("install", CommandOutcome::success("Success"));
        let (temp, mut engine) = engine(runner);
        let artifact = temp.path().join("game.apk");
        std::fs::write(&artifact, b"apk").unwrap();
        engine
            .install("10.0.0.5:5555", &artifact, InstallOptions::default())
            .await;

        let result = engine
            .install(
                "10.0.0.5:5555",
                Path::new("/no/such/typo.apk"),
                InstallOptions::default(),
            )
            .await;

        assert!(!result.success);
        assert_eq!(engine.runner().calls().len(), 1);
        let reloaded = SettingsStore::load(engine.store().path());
        assert_eq!(reloaded.settings().last_artifact_path, Some(artifact));
    }

    #[tokio::test]
    async fn test_visible_apps_follow_show_all_flag() {
        let runner = FakeRunner::new();
        runner.respond(
            "packages",
            CommandOutcome::success("package:com.defaultcompany.demo\npackage:com.facebook.katana"),
        );
        let (_temp, mut engine) = engine(runner);

        engine.refresh_apps("10.0.0.5:5555").await;
        assert_eq!(engine.visible_apps().len(), 1);

        engine.set_show_all_apps(true);
        assert_eq!(engine.visible_apps().len(), 2);
        assert!(SettingsStore::load(engine.store().path()).settings().show_all_apps);
    }

    #[tokio::test]
    async fn test_disconnect_clears_apps() {
        let runner = FakeRunner::new();
        runner
            .respond("connect", CommandOutcome::success("connected"))
            .respond("disconnect", CommandOutcome::success("disconnected 10.0.0.5:5555"))
            .respond("packages", CommandOutcome::success("package:com.unity.demo"))
            .respond("devices", CommandOutcome::success("List of devices attached"));
        let (_temp, mut engine) = engine(runner);

        engine.connect("10.0.0.5", 5555).await;
        engine.refresh_apps("10.0.0.5:5555").await;
        assert_eq!(engine.inventory().apps().len(), 1);

        engine.disconnect().await;
        assert!(engine.inventory().apps().is_empty());
        assert!(!engine.state().is_connected());
    }

    #[test]
    fn test_toggle_auto_deploy_persists() {
        let (_temp, mut engine) = engine(FakeRunner::new());

        assert!(engine.toggle_auto_deploy());
        assert!(SettingsStore::load(engine.store().path())
            .settings()
            .auto_deploy_after_build);
        assert!(!engine.toggle_auto_deploy());
    }

    #[tokio::test]
    async fn test_forget_device_updates_candidates() {
        let runner = FakeRunner::new();
        runner.respond(
            "devices",
            CommandOutcome::success("List of devices attached\n10.0.0.5:5555\tdevice"),
        );
        let (_temp, mut engine) = engine(runner);
        engine.store_mut().record_connection("Quest", "10.0.0.5", 5555);
        engine.store_mut().record_connection("Glasses", "10.0.0.6", 5555);
        engine.scan().await;
        assert_eq!(engine.candidates().len(), 2);

        assert_eq!(engine.forget_device("10.0.0.5"), 1);
        assert_eq!(engine.forget_device("10.0.0.6"), 1);

        // Still reported live, no longer saved
        assert_eq!(engine.candidates().len(), 1);
        assert!(!engine.candidates()[0].origin.from_registry);
        assert!(engine.settings().devices.is_empty());
    }

    #[test]
    fn test_rename_device() {
        let (_temp, mut engine) = engine(FakeRunner::new());
        engine.store_mut().record_connection("10.0.0.5", "10.0.0.5", 5555);

        assert!(engine.rename_device("10.0.0.5", "Quest 3"));
        assert!(!engine.rename_device("10.0.0.9", "Nobody"));
        assert_eq!(engine.settings().devices.find("10.0.0.5").unwrap().name, "Quest 3");
    }
}
