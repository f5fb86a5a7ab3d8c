//! adeploy-app - Device workflows for the Android wireless deployer
//!
//! Owns the persisted settings and device registry, discovery, the
//! pair/connect workflow, deploy operations, the installed-app inventory, and
//! the [`Engine`] that ties them together for any front end (CLI, tests).

pub mod auto_deploy;
pub mod config;
pub mod connection;
pub mod deploy;
pub mod discovery;
pub mod engine;
pub mod inventory;
pub mod registry;

// Re-export primary types
pub use auto_deploy::{BuildCompleted, DeployReport, DeployStage};
pub use config::{Settings, SettingsStore};
pub use connection::ConnectionWorkflow;
pub use deploy::InstallOptions;
pub use engine::Engine;
pub use inventory::AppInventory;
pub use registry::DeviceRegistry;

// Re-export adb types for front ends
pub use adeploy_adb::{AdbLocator, AdbRunner, CommandOutcome, CommandRunner};
