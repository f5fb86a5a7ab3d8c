//! Configuration types for adeploy

use std::path::PathBuf;

use adeploy_core::DEFAULT_ADB_PORT;
use serde::{Deserialize, Serialize};

use crate::registry::DeviceRegistry;

/// Persisted user settings.
///
/// Unknown or missing fields fall back to [`Settings::default`] so older
/// files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last address used for pairing
    pub pair_address: String,

    /// Last pairing port (random per pairing session on the device)
    pub pair_port: Option<u16>,

    /// Last address used for connecting
    pub connect_address: String,

    /// Last port used for connecting
    pub connect_port: u16,

    /// Last artifact built or installed
    pub last_artifact_path: Option<PathBuf>,

    /// Show every third-party package instead of only engine-built ones
    pub show_all_apps: bool,

    /// Connect, install and launch after each successful Android build
    pub auto_deploy_after_build: bool,

    /// Explicit adb binary; PATH and SDK lookup are used when unset
    pub adb_path: Option<PathBuf>,

    /// Package id launched after deploy when the build event carries none
    pub application_id: Option<String>,

    /// Previously-connected devices
    pub devices: DeviceRegistry,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pair_address: String::new(),
            pair_port: None,
            connect_address: String::new(),
            connect_port: DEFAULT_ADB_PORT,
            last_artifact_path: None,
            show_all_apps: false,
            auto_deploy_after_build: false,
            adb_path: None,
            application_id: None,
            devices: DeviceRegistry::default(),
        }
    }
}
