//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// adeploy - Pair, connect and deploy to wireless-debugging Android devices
#[derive(Parser, Debug)]
#[command(name = "adeploy", version)]
#[command(about = "Pair, connect and deploy to wireless-debugging Android devices", long_about = None)]
pub struct Args {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "ADEPLOY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved devices and devices adb currently reports
    Devices,

    /// Pair using the code from the device's wireless debugging screen
    Pair {
        address: String,
        port: u16,
        code: String,
    },

    /// Connect to a device (defaults to the last connect address)
    Connect {
        address: Option<String>,
        port: Option<u16>,
    },

    /// Disconnect the given or most recent device
    Disconnect {
        #[arg(long, short)]
        serial: Option<String>,
    },

    /// Install an APK (defaults to the last artifact)
    Install {
        artifact: Option<PathBuf>,

        #[arg(long, short)]
        serial: Option<String>,

        /// Refuse version code downgrades
        #[arg(long)]
        no_downgrade: bool,

        /// Do not grant runtime permissions on install
        #[arg(long)]
        no_grant: bool,
    },

    /// Uninstall a package
    Uninstall {
        package: String,

        #[arg(long, short)]
        serial: Option<String>,
    },

    /// Launch an app (defaults to the configured application id)
    Launch {
        package: Option<String>,

        #[arg(long, short)]
        serial: Option<String>,
    },

    /// Force-stop an app (defaults to the configured application id)
    Stop {
        package: Option<String>,

        #[arg(long, short)]
        serial: Option<String>,
    },

    /// List installed third-party apps
    Apps {
        /// Show every app from now on, not only engine/XR ones
        #[arg(long, conflicts_with = "relevant")]
        all: bool,

        /// Show only engine/XR apps from now on
        #[arg(long)]
        relevant: bool,

        /// Uninstall this package after listing
        #[arg(long, value_name = "PACKAGE")]
        uninstall: Option<String>,

        #[arg(long, short)]
        serial: Option<String>,
    },

    /// Remove a saved device
    Forget { address: String },

    /// Rename a saved device
    Rename { address: String, name: String },

    /// Connect, install the last artifact and launch it on the most recent device
    Deploy,

    /// Post-build hook: deploy the fresh build if auto-deploy is on
    BuildComplete {
        /// Built APK
        artifact: PathBuf,

        #[arg(long, default_value = "android")]
        platform: String,

        /// The build failed
        #[arg(long)]
        failed: bool,

        /// Package id to launch after install
        #[arg(long, value_name = "ID")]
        application_id: Option<String>,
    },

    /// Turn deploy-after-build on or off
    AutoDeploy {
        #[arg(value_enum)]
        mode: Toggle,
    },

    /// Print the Android SDK location
    Sdk,

    /// Print the wireless debugging documentation URL
    Docs,

    /// Print the adb path and version
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
    Toggle,
}

impl Command {
    /// Whether the command cannot run without adb.
    ///
    /// `build-complete` locates adb itself, and only when it deploys.
    pub fn needs_adb(&self) -> bool {
        !matches!(
            self,
            Command::BuildComplete { .. }
                | Command::Forget { .. }
                | Command::Rename { .. }
                | Command::AutoDeploy { .. }
                | Command::Sdk
                | Command::Docs
        )
    }
}
