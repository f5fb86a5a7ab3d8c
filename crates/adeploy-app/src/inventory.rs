//! Installed third-party apps on the active device
//!
//! The list is rebuilt on every refresh and never persisted.

use std::sync::LazyLock;

use adeploy_adb::{parse_package_list, AdbCommand, CommandRunner};
use adeploy_core::prelude::*;
use adeploy_core::{AppRecord, OperationResult};
use regex::Regex;

use crate::deploy;

/// Package id fragments that mark an app as built with the engine or aimed
/// at XR hardware
pub const RELEVANT_KEYWORDS: &[&str] = &[
    "unity",
    "defaultcompany",
    "viture",
    "xreal",
    "nreal",
    "rokid",
    "rayneo",
    "oculus",
    "pico",
    "vive",
    "magicleap",
    "varjo",
];

/// Upper-case letter not at a word start
static INNER_CAPITAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B([A-Z])").expect("Invalid inner capital regex"));

/// Case-insensitive keyword match against the package id
pub fn is_relevant(package_id: &str) -> bool {
    let lower = package_id.to_lowercase();
    RELEVANT_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// `com.defaultcompany.MyGameTitle` -> `My Game Title`
pub fn display_name(package_id: &str) -> String {
    let last = package_id.rsplit('.').next().unwrap_or(package_id);
    let spaced = INNER_CAPITAL_REGEX.replace_all(last, " $1");

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn app_record(package_id: &str) -> AppRecord {
    AppRecord {
        package_id: package_id.to_string(),
        display_name: display_name(package_id),
        relevant: is_relevant(package_id),
    }
}

/// Cached app list for the connected device
#[derive(Debug, Clone, Default)]
pub struct AppInventory {
    apps: Vec<AppRecord>,
}

impl AppInventory {
    pub fn apps(&self) -> &[AppRecord] {
        &self.apps
    }

    /// Re-list third-party packages on `serial`.
    ///
    /// On failure the previous list is kept.
    pub async fn refresh<R: CommandRunner>(&mut self, runner: &R, serial: &str) -> OperationResult {
        let outcome = runner
            .run(&AdbCommand::ListPackages {
                serial: serial.to_string(),
                third_party_only: true,
            })
            .await;

        if !outcome.succeeded {
            warn!("Listing packages on {} failed: {}", serial, outcome.output);
            return OperationResult::failure(outcome.output);
        }

        self.apps = parse_package_list(&outcome.output)
            .iter()
            .map(|id| app_record(id))
            .collect();

        let relevant = self.apps.iter().filter(|a| a.relevant).count();
        info!(
            "Found {} apps on {} ({} relevant)",
            self.apps.len(),
            serial,
            relevant
        );
        OperationResult::success(format!("{} apps", self.apps.len()))
    }

    /// All apps or only relevant ones, sorted by display name
    pub fn apply_filter(&self, show_all: bool) -> Vec<AppRecord> {
        let mut visible: Vec<AppRecord> = self
            .apps
            .iter()
            .filter(|a| show_all || a.relevant)
            .cloned()
            .collect();
        visible.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        visible
    }

    /// Uninstall `record` and drop it from the list on success
    pub async fn uninstall_selected<R: CommandRunner>(
        &mut self,
        runner: &R,
        serial: &str,
        record: &AppRecord,
    ) -> OperationResult {
        let result = deploy::uninstall(runner, serial, &record.package_id).await;
        if result.success {
            self.apps.retain(|a| a.package_id != record.package_id);
        }
        result
    }

    pub fn clear(&mut self) {
        self.apps.clear();
    }
}
