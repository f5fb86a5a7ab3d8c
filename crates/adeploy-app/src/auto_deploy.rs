//! Post-build deploy hook
//!
//! Consumes a [`BuildCompleted`] event from the build pipeline and runs
//! connect, install and launch against the most recently used device. Nothing
//! here returns an error: a failed deploy must never fail the build, so every
//! outcome is a [`DeployReport`].

use std::fmt;
use std::path::{Path, PathBuf};

use adeploy_adb::CommandRunner;
use adeploy_core::prelude::*;
use adeploy_core::DeviceRecord;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::deploy::InstallOptions;
use crate::engine::Engine;

/// Platform name the hook reacts to
pub const TARGET_PLATFORM: &str = "android";

/// Build pipeline notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCompleted {
    /// Path of the built APK
    pub output_path: PathBuf,

    pub succeeded: bool,

    /// Build target platform, e.g. "Android"
    pub platform: String,

    /// Package id from the build configuration, if known
    #[serde(default)]
    pub application_id: Option<String>,
}

impl BuildCompleted {
    pub fn targets_android(&self) -> bool {
        self.platform.trim().eq_ignore_ascii_case(TARGET_PLATFORM)
    }

    /// Device the hook should deploy this build to, or the skip report.
    ///
    /// Only reads settings; callers can run it before adb is even located.
    pub fn auto_deploy_target(
        &self,
        settings: &Settings,
    ) -> std::result::Result<DeviceRecord, DeployReport> {
        if !self.succeeded {
            return Err(DeployReport::skipped("build failed"));
        }
        if !self.targets_android() {
            return Err(DeployReport::skipped(format!(
                "platform {} is not Android",
                self.platform
            )));
        }
        if !settings.auto_deploy_after_build {
            return Err(DeployReport::skipped("auto-deploy is disabled"));
        }
        match settings.devices.most_recent() {
            Some(device) => Ok(device.clone()),
            None => {
                info!("Auto-deploy: no saved device, nothing to do");
                Err(DeployReport::skipped("no saved device"))
            }
        }
    }
}

/// Step of the deploy chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Connect,
    Install,
    ResolvePackage,
    Launch,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStage::Connect => write!(f, "connect"),
            DeployStage::Install => write!(f, "install"),
            DeployStage::ResolvePackage => write!(f, "resolve package"),
            DeployStage::Launch => write!(f, "launch"),
        }
    }
}

/// What a deploy attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployReport {
    /// Preconditions not met; no adb command was run
    Skipped { reason: String },

    /// A step failed and the rest of the chain was abandoned
    Failed { stage: DeployStage, message: String },

    /// Installed and launched
    Deployed { serial: String, package: String },
}

impl DeployReport {
    fn skipped(reason: impl Into<String>) -> Self {
        DeployReport::Skipped {
            reason: reason.into(),
        }
    }

    fn failed(stage: DeployStage, message: impl Into<String>) -> Self {
        DeployReport::Failed {
            stage,
            message: message.into(),
        }
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, DeployReport::Deployed { .. })
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployReport::Skipped { reason } => write!(f, "Deploy skipped: {}", reason),
            DeployReport::Failed { stage, message } => {
                write!(f, "Deploy failed at {}: {}", stage, message)
            }
            DeployReport::Deployed { serial, package } => {
                write!(f, "Deployed {} to {}", package, serial)
            }
        }
    }
}

impl<R: CommandRunner> Engine<R> {
    /// React to a finished build.
    ///
    /// No-op unless the build succeeded, targeted Android and auto-deploy is
    /// enabled. Uses the most recently connected registry device.
    pub async fn auto_deploy_on_build_complete(&mut self, event: &BuildCompleted) -> DeployReport {
        let device = match event.auto_deploy_target(self.settings()) {
            Ok(device) => device,
            Err(skipped) => return skipped,
        };

        info!(
            "Auto-deploying {} to {}",
            event.output_path.display(),
            device.name
        );
        let artifact = event.output_path.clone();
        self.store_mut()
            .update(|s| s.last_artifact_path = Some(artifact));

        let package = event
            .application_id
            .clone()
            .or_else(|| self.settings().application_id.clone());

        let report = self.deploy_to(&device, &event.output_path, package).await;
        log_report(&report);
        report
    }

    /// Connect, install and launch using the most recent device and the last
    /// artifact
    pub async fn quick_deploy(&mut self) -> DeployReport {
        let Some(device) = self.settings().devices.most_recent().cloned() else {
            return DeployReport::skipped("no saved device; connect to one first");
        };
        let Some(artifact) = self.settings().last_artifact_path.clone() else {
            return DeployReport::skipped("no artifact built or installed yet");
        };
        let package = self.settings().application_id.clone();

        let report = self.deploy_to(&device, &artifact, package).await;
        log_report(&report);
        report
    }

    async fn deploy_to(
        &mut self,
        device: &DeviceRecord,
        artifact: &Path,
        package: Option<String>,
    ) -> DeployReport {
        let connected = self.connect(&device.address, device.port).await;
        if !connected.success {
            return DeployReport::failed(DeployStage::Connect, connected.message);
        }

        let serial = device.serial();
        let installed = self
            .install(&serial, artifact, InstallOptions::default())
            .await;
        if !installed.success {
            return DeployReport::failed(DeployStage::Install, installed.message);
        }

        let Some(package) = package.filter(|p| !p.trim().is_empty()) else {
            return DeployReport::failed(
                DeployStage::ResolvePackage,
                "no application id in the build event or settings",
            );
        };

        let launched = self.launch(&serial, &package).await;
        if !launched.success {
            return DeployReport::failed(DeployStage::Launch, launched.message);
        }

        DeployReport::Deployed { serial, package }
    }
}

fn log_report(report: &DeployReport) {
    match report {
        DeployReport::Deployed { .. } => info!("{}", report),
        DeployReport::Skipped { .. } => info!("{}", report),
        DeployReport::Failed { .. } => error!("{}", report),
    }
}
