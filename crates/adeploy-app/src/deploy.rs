//! Install / uninstall / launch / stop against a connected device
//!
//! `adb install` and `adb uninstall` print a per-operation `Success` token and
//! can exit zero without it, so both the exit status and the token are
//! required. `monkey` and `am force-stop` print no such token and are judged
//! by exit status only.

use std::path::Path;

use adeploy_adb::{AdbCommand, CommandOutcome, CommandRunner};
use adeploy_core::prelude::*;
use adeploy_core::OperationResult;

/// Token adb prints when an install or uninstall went through
const SUCCESS_TOKEN: &str = "Success";

/// Flags passed to `adb install` besides `-r`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// `-d`: allow version code downgrade
    pub allow_downgrade: bool,
    /// `-g`: grant all runtime permissions
    pub grant_permissions: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            allow_downgrade: true,
            grant_permissions: true,
        }
    }
}

/// Check `adb install` / `adb uninstall` output for success
pub fn is_package_op_success(outcome: &CommandOutcome) -> bool {
    outcome.succeeded && outcome.output_contains(SUCCESS_TOKEN)
}

/// Install an APK on `serial`, replacing any existing version
pub async fn install<R: CommandRunner>(
    runner: &R,
    serial: &str,
    artifact: &Path,
    options: InstallOptions,
) -> OperationResult {
    if artifact.as_os_str().is_empty() {
        return OperationResult::failure("No artifact selected");
    }
    if !artifact.is_file() {
        return OperationResult::failure(format!("Artifact not found: {}", artifact.display()));
    }

    info!("Installing {} on {}", artifact.display(), serial);
    let outcome = runner
        .run(&AdbCommand::Install {
            serial: serial.to_string(),
            artifact: artifact.to_path_buf(),
            allow_downgrade: options.allow_downgrade,
            grant_permissions: options.grant_permissions,
        })
        .await;

    classify_package_op("install", serial, outcome)
}

/// Remove `package` from `serial`
pub async fn uninstall<R: CommandRunner>(runner: &R, serial: &str, package: &str) -> OperationResult {
    info!("Uninstalling {} from {}", package, serial);
    let outcome = runner
        .run(&AdbCommand::Uninstall {
            serial: serial.to_string(),
            package: package.to_string(),
        })
        .await;

    classify_package_op("uninstall", serial, outcome)
}

/// Start the launcher activity of `package`
pub async fn launch_app<R: CommandRunner>(runner: &R, serial: &str, package: &str) -> OperationResult {
    info!("Launching {} on {}", package, serial);
    let outcome = runner
        .run(&AdbCommand::Launch {
            serial: serial.to_string(),
            package: package.to_string(),
        })
        .await;

    classify_by_exit_status("launch", outcome)
}

/// Force-stop `package`
pub async fn stop_app<R: CommandRunner>(runner: &R, serial: &str, package: &str) -> OperationResult {
    info!("Stopping {} on {}", package, serial);
    let outcome = runner
        .run(&AdbCommand::ForceStop {
            serial: serial.to_string(),
            package: package.to_string(),
        })
        .await;

    classify_by_exit_status("stop", outcome)
}

fn classify_package_op(op: &str, serial: &str, outcome: CommandOutcome) -> OperationResult {
    if is_package_op_success(&outcome) {
        info!("{} on {} succeeded", op, serial);
        OperationResult::success(outcome.output)
    } else {
        warn!("{} on {} failed: {}", op, serial, outcome.output);
        OperationResult::failure(outcome.output)
    }
}

fn classify_by_exit_status(op: &str, outcome: CommandOutcome) -> OperationResult {
    if outcome.succeeded {
        OperationResult::success(outcome.output)
    } else {
        warn!("{} failed: {}", op, outcome.output);
        OperationResult::failure(outcome.output)
    }
}
