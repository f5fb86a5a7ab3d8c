//! Command building for adb invocations
//!
//! Each [`AdbCommand`] maps 1-to-1 onto one `adb` command line. No chaining,
//! no shell pipelines.

use std::fmt;
use std::path::PathBuf;

use adeploy_core::serial_for;

/// Intent category passed to `monkey` so it starts the launcher activity
const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

/// A single `adb` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbCommand {
    /// `adb version`
    Version,
    /// `adb devices`
    Devices,
    /// `adb pair <addr>:<port> <code>`
    Pair {
        address: String,
        port: u16,
        code: String,
    },
    /// `adb connect <addr>:<port>`
    Connect { address: String, port: u16 },
    /// `adb disconnect <addr>:<port>`
    Disconnect { address: String, port: u16 },
    /// `adb -s <serial> install -r [-d] [-g] <path>`
    Install {
        serial: String,
        artifact: PathBuf,
        allow_downgrade: bool,
        grant_permissions: bool,
    },
    /// `adb -s <serial> uninstall <package>`
    Uninstall { serial: String, package: String },
    /// `adb -s <serial> shell pm list packages [-3]`
    ListPackages {
        serial: String,
        third_party_only: bool,
    },
    /// `adb -s <serial> shell monkey -p <package> -c <launcher> 1`
    Launch { serial: String, package: String },
    /// `adb -s <serial> shell am force-stop <package>`
    ForceStop { serial: String, package: String },
}

impl AdbCommand {
    /// Build the argument vector passed to the `adb` process
    pub fn args(&self) -> Vec<String> {
        match self {
            AdbCommand::Version => vec!["version".to_string()],
            AdbCommand::Devices => vec!["devices".to_string()],
            AdbCommand::Pair {
                address,
                port,
                code,
            } => vec![
                "pair".to_string(),
                serial_for(address, *port),
                code.clone(),
            ],
            AdbCommand::Connect { address, port } => {
                vec!["connect".to_string(), serial_for(address, *port)]
            }
            AdbCommand::Disconnect { address, port } => {
                vec!["disconnect".to_string(), serial_for(address, *port)]
            }
            AdbCommand::Install {
                serial,
                artifact,
                allow_downgrade,
                grant_permissions,
            } => {
                let mut args = with_serial(serial, ["install", "-r"]);
                if *allow_downgrade {
                    args.push("-d".to_string());
                }
                if *grant_permissions {
                    args.push("-g".to_string());
                }
                args.push(artifact.to_string_lossy().into_owned());
                args
            }
            AdbCommand::Uninstall { serial, package } => {
                with_serial(serial, ["uninstall", package.as_str()])
            }
            AdbCommand::ListPackages {
                serial,
                third_party_only,
            } => {
                let mut args = with_serial(serial, ["shell", "pm", "list", "packages"]);
                if *third_party_only {
                    args.push("-3".to_string());
                }
                args
            }
            AdbCommand::Launch { serial, package } => with_serial(
                serial,
                [
                    "shell",
                    "monkey",
                    "-p",
                    package.as_str(),
                    "-c",
                    LAUNCHER_CATEGORY,
                    "1",
                ],
            ),
            AdbCommand::ForceStop { serial, package } => {
                with_serial(serial, ["shell", "am", "force-stop", package.as_str()])
            }
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            AdbCommand::Version => "get version",
            AdbCommand::Devices => "list devices",
            AdbCommand::Pair { .. } => "pair",
            AdbCommand::Connect { .. } => "connect",
            AdbCommand::Disconnect { .. } => "disconnect",
            AdbCommand::Install { .. } => "install",
            AdbCommand::Uninstall { .. } => "uninstall",
            AdbCommand::ListPackages { .. } => "list packages",
            AdbCommand::Launch { .. } => "launch app",
            AdbCommand::ForceStop { .. } => "stop app",
        }
    }
}

fn with_serial<'a>(serial: &str, rest: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut args = vec!["-s".to_string(), serial.to_string()];
    args.extend(rest.into_iter().map(str::to_string));
    args
}

/// Renders the command line as a user would type it.
///
/// Arguments containing whitespace are quoted. The pairing code is masked so
/// it never reaches the log file.
impl fmt::Display for AdbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adb")?;
        let args = self.args();
        for (i, arg) in args.iter().enumerate() {
            let masked = matches!(self, AdbCommand::Pair { .. }) && i == 2;
            if masked {
                write!(f, " ******")?;
            } else if arg.chars().any(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
