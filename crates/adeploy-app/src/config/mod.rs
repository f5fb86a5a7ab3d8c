//! Settings persistence for adeploy
//!
//! A single JSON file at a per-user location holds the last-used pairing and
//! connect fields, the last artifact, UI flags and the device registry.

pub mod settings;
pub mod types;

pub use settings::{default_settings_path, load_settings, save_settings, SettingsStore};
pub use types::Settings;
