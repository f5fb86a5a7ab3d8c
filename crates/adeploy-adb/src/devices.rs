//! Device listing using the `adb devices` command

use adeploy_core::prelude::*;
use adeploy_core::DEFAULT_ADB_PORT;

use crate::commands::AdbCommand;
use crate::runner::CommandRunner;

/// adb state string for a device that is known but not reachable
const OFFLINE_STATE: &str = "offline";

/// Single-token states `adb devices` prints besides `offline`
const KNOWN_STATES: &[&str] = &[
    "device",
    "unauthorized",
    "authorizing",
    "connecting",
    "recovery",
    "rescue",
    "sideload",
    "bootloader",
    "host",
];

/// A device currently reported by `adb devices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingDevice {
    /// Serial exactly as adb printed it
    pub serial: String,

    /// Host part of the serial
    pub address: String,

    /// Port part of the serial, [`DEFAULT_ADB_PORT`] if none was given
    pub port: u16,

    /// adb state column (`device`, `unauthorized`, ...)
    pub state: String,
}

/// List devices currently reported by adb.
///
/// Returns an error carrying the raw output when the command fails, so the
/// caller can decide whether to degrade.
pub async fn list_reporting_devices<R: CommandRunner>(runner: &R) -> Result<Vec<ReportingDevice>> {
    let outcome = runner.run(&AdbCommand::Devices).await;
    if !outcome.succeeded {
        return Err(Error::process(format!(
            "adb devices failed: {}",
            outcome.output
        )));
    }

    let devices = parse_devices_output(&outcome.output);
    debug!("adb reports {} usable devices", devices.len());
    Ok(devices)
}

/// Parse the output of `adb devices`.
///
/// Format after the header line is `<serial>\t<state>`. Header lines,
/// daemon chatter, `offline` entries and lines that cannot be split into an
/// address and port are skipped.
pub fn parse_devices_output(output: &str) -> Vec<ReportingDevice> {
    output.lines().filter_map(parse_device_line).collect()
}

fn parse_device_line(line: &str) -> Option<ReportingDevice> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
        return None;
    }

    let mut columns = line.split_whitespace();
    let (serial, state) = match (columns.next(), columns.next(), columns.next()) {
        (Some(serial), Some(state), None) => (serial, state),
        _ => {
            trace!("Skipping adb output line: {}", line);
            return None;
        }
    };

    if state.eq_ignore_ascii_case(OFFLINE_STATE) {
        trace!("Skipping offline device {}", serial);
        return None;
    }
    if !KNOWN_STATES.iter().any(|known| state.eq_ignore_ascii_case(known)) {
        trace!("Skipping {} in unknown state {}", serial, state);
        return None;
    }

    let (address, port) = split_serial(serial)?;

    Some(ReportingDevice {
        serial: serial.to_string(),
        address,
        port,
        state: state.to_string(),
    })
}

/// Split `host:port` into its parts, defaulting the port when absent.
///
/// Returns `None` when a port is present but not a valid number.
pub fn split_serial(serial: &str) -> Option<(String, u16)> {
    match serial.rsplit_once(':') {
        Some((address, port)) => {
            if address.is_empty() {
                return None;
            }
            let port = port.parse::<u16>().ok()?;
            Some((address.to_string(), port))
        }
        None if !serial.is_empty() => Some((serial.to_string(), DEFAULT_ADB_PORT)),
        None => None,
    }
}
