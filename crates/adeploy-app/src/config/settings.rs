//! Settings loading and saving
//!
//! Load never fails: a missing or corrupt file yields defaults. Saves go
//! through [`SettingsStore::persist`], which logs and swallows I/O errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use adeploy_core::prelude::*;
use fs2::FileExt;

use super::types::Settings;
use crate::registry::DeviceRegistry;

const APP_DIR: &str = "adeploy";
const SETTINGS_FILENAME: &str = "settings.json";

/// Default per-user settings location, e.g. `~/.config/adeploy/settings.json`
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILENAME)
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from `path`
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        debug!("No settings file at {:?}, using defaults", path);
        return Settings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            Settings::default()
        }
    }
}

/// Save settings to `path`
///
/// Uses atomic write (temp file + rename) for safety. The temp file is held
/// under an exclusive lock while it is written.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::config(format!("Failed to create settings dir: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let temp_path = path.with_extension("json.tmp");

    {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::config(format!("Failed to open temp file: {}", e)))?;

        file.lock_exclusive()
            .map_err(|e| Error::config(format!("Failed to lock temp file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;
        file.flush()
            .map_err(|e| Error::config(format!("Failed to flush temp file: {}", e)))?;
        // Lock is released when file is dropped
    }

    std::fs::rename(&temp_path, path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    debug!("Saved settings to {:?}", path);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Store
// ─────────────────────────────────────────────────────────────────────────────

/// Loaded settings plus the file they persist to.
///
/// Created once at workflow start and passed to the workflows explicitly.
/// Every mutating method persists immediately.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load from `path`, falling back to defaults
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load_settings(&path);
        Self { path, settings }
    }

    /// Wrap already-built settings without touching disk
    pub fn with_settings(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.settings.devices
    }

    /// Apply a mutation and persist
    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.persist();
    }

    /// Record a successful connection in the registry and persist
    pub fn record_connection(&mut self, name: &str, address: &str, port: u16) {
        self.update(|settings| settings.devices.upsert(name, address, port));
    }

    /// Remove a device from the registry and persist.
    ///
    /// Returns the number of records removed.
    pub fn forget_device(&mut self, address: &str) -> usize {
        let removed = self.settings.devices.remove(address);
        self.persist();
        removed
    }

    /// Write settings to disk.
    ///
    /// Failures are logged and reported as `false`; they never propagate.
    pub fn persist(&self) -> bool {
        match save_settings(&self.path, &self.settings) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save settings to {:?}: {}", self.path, e);
                false
            }
        }
    }
}
