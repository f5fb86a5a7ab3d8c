//! # adeploy-adb - adb Process Management
//!
//! Runs the external `adb` binary and turns its text output into typed values.
//!
//! Depends on [`adeploy_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Command Execution
//! - [`CommandRunner`] - Async seam for running one `adb` command line
//! - [`AdbRunner`] - Production runner backed by `tokio::process`
//! - [`CommandOutcome`] - Success flag plus combined, trimmed output
//! - [`AdbCommand`] - Builder for every supported `adb` subcommand
//!
//! ### Output Parsing
//! - [`parse_devices_output()`] - Parse `adb devices` into [`ReportingDevice`]s
//! - [`parse_package_list()`] - Parse `pm list packages` output
//! - [`parse_adb_version()`] - Extract the version from `adb version`
//!
//! ### Tool Lookup
//! - [`AdbLocator`] - Find the `adb` binary and the Android SDK

pub mod commands;
pub mod devices;
pub mod packages;
pub mod runner;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

// Public API re-exports
pub use commands::AdbCommand;
pub use devices::{list_reporting_devices, parse_devices_output, ReportingDevice};
pub use packages::{parse_package_list, PACKAGE_PREFIX};
pub use runner::{AdbRunner, CommandOutcome, CommandRunner, LocalCommandRunner};
pub use tool_availability::{parse_adb_version, AdbLocator};
