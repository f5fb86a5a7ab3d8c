//! Core domain type definitions

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Port adb uses for TCP/IP devices when none is given
pub const DEFAULT_ADB_PORT: u16 = 5555;

/// Build the `address:port` serial adb uses to identify a network device
pub fn serial_for(address: &str, port: u16) -> String {
    format!("{}:{}", address, port)
}

// ─────────────────────────────────────────────────────────────────────────────
// Device registry
// ─────────────────────────────────────────────────────────────────────────────

/// A previously-connected device, persisted in the settings file.
///
/// Identity key is `address`: reconnecting updates `port` and
/// `last_connected` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Display label
    pub name: String,

    /// Host (IP address or hostname)
    pub address: String,

    /// Port of the last successful connection
    pub port: u16,

    /// RFC 3339 timestamp of the last successful connection
    #[serde(default)]
    pub last_connected: Option<String>,
}

impl DeviceRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
            last_connected: None,
        }
    }

    /// Set the last-connected timestamp (builder pattern)
    pub fn with_last_connected(mut self, at: DateTime<Utc>) -> Self {
        self.last_connected = Some(at.to_rfc3339());
        self
    }

    /// Parsed last-connected timestamp.
    ///
    /// Accepts RFC 3339 and ISO-8601 without an offset (read as UTC).
    /// `None` when absent or unparsable; callers treat that as the oldest
    /// possible value.
    pub fn last_connected_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_connected.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
            .ok()
    }

    /// Sort key where missing timestamps compare as the minimum
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.last_connected_at().unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn serial(&self) -> String {
        serial_for(&self.address, self.port)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// Where a candidate device was seen during a discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceOrigin {
    /// Present in the persisted registry
    pub from_registry: bool,
    /// Currently reported by `adb devices`
    pub live: bool,
}

/// A device surfaced by a single discovery pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDevice {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub origin: DeviceOrigin,
}

impl CandidateDevice {
    /// Candidate seeded from a registry record
    pub fn from_record(record: &DeviceRecord) -> Self {
        Self {
            name: record.name.clone(),
            address: record.address.clone(),
            port: record.port,
            origin: DeviceOrigin {
                from_registry: true,
                live: false,
            },
        }
    }

    /// Candidate reported live by adb but unknown to the registry
    pub fn live(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
            origin: DeviceOrigin {
                from_registry: false,
                live: true,
            },
        }
    }

    /// Check if this candidate points at the given endpoint
    pub fn is_endpoint(&self, address: &str, port: u16) -> bool {
        self.address == address && self.port == port
    }

    pub fn serial(&self) -> String {
        serial_for(&self.address, self.port)
    }

    /// Get a display string for the device
    pub fn display_string(&self) -> String {
        let origin = match (self.origin.from_registry, self.origin.live) {
            (true, true) => "saved, online",
            (true, false) => "saved",
            (false, true) => "online",
            (false, false) => "unknown",
        };
        format!("{} ({}) [{}]", self.name, self.serial(), origin)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection state
// ─────────────────────────────────────────────────────────────────────────────

/// Connection state of the workflow.
///
/// Only one serial is tracked as active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Pairing,
    Connecting,
    Connected {
        serial: String,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    /// Serial of the active device, if connected
    pub fn serial(&self) -> Option<&str> {
        match self {
            ConnectionState::Connected { serial } => Some(serial),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Pairing => write!(f, "Pairing"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected { serial } => write!(f, "Connected ({})", serial),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App inventory
// ─────────────────────────────────────────────────────────────────────────────

/// An installed third-party package on the active device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    /// Package identifier, e.g. `com.defaultcompany.MyGame`
    pub package_id: String,

    /// Human-friendly name derived from the identifier
    pub display_name: String,

    /// Whether the package looks like one built by the deploying engine
    pub relevant: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation results
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a workflow operation.
///
/// Workflow operations never raise; failures carry the raw tool output or a
/// user-facing notice in `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serial_for() {
        assert_eq!(serial_for("192.168.1.20", 5555), "192.168.1.20:5555");
    }

    #[test]
    fn test_last_connected_parses_rfc3339() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = DeviceRecord::new("Quest", "10.0.0.5", 5555).with_last_connected(at);
        assert_eq!(record.last_connected_at(), Some(at));
    }

    #[test]
    fn test_last_connected_without_offset_is_utc() {
        let mut record = DeviceRecord::new("Quest", "10.0.0.5", 5555);
        record.last_connected = Some("2026-01-02T03:04:05".to_string());
        assert_eq!(
            record.last_connected_at(),
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
        );

        record.last_connected = Some("2026-01-02T03:04:05.250".to_string());
        assert!(record.recency_key() > Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_unparsable_timestamp_is_minimum() {
        let mut record = DeviceRecord::new("Quest", "10.0.0.5", 5555);
        record.last_connected = Some("yesterday-ish".to_string());
        assert_eq!(record.last_connected_at(), None);
        assert_eq!(record.recency_key(), DateTime::<Utc>::MIN_UTC);

        let absent = DeviceRecord::new("Glasses", "10.0.0.6", 5555);
        assert_eq!(absent.recency_key(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_device_record_json_layout() {
        let json = r#"{"name":"Pixel","address":"192.168.1.7","port":41234,"last_connected":"2026-01-02T03:04:05+00:00"}"#;
        let record: DeviceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.port, 41234);
        assert!(record.last_connected_at().is_some());

        // Missing timestamp field is accepted
        let json = r#"{"name":"Pixel","address":"192.168.1.7","port":5555}"#;
        let record: DeviceRecord = serde_json::from_str(json).unwrap();
        assert!(record.last_connected.is_none());
    }

    #[test]
    fn test_connection_state_serial() {
        assert_eq!(ConnectionState::Disconnected.serial(), None);
        assert_eq!(ConnectionState::Pairing.serial(), None);

        let state = ConnectionState::Connected {
            serial: "10.0.0.5:5555".to_string(),
        };
        assert!(state.is_connected());
        assert_eq!(state.serial(), Some("10.0.0.5:5555"));
        assert_eq!(state.to_string(), "Connected (10.0.0.5:5555)");
    }

    #[test]
    fn test_candidate_display_string() {
        let record = DeviceRecord::new("Quest 3", "10.0.0.5", 5555);
        let mut candidate = CandidateDevice::from_record(&record);
        assert_eq!(candidate.display_string(), "Quest 3 (10.0.0.5:5555) [saved]");

        candidate.origin.live = true;
        assert_eq!(
            candidate.display_string(),
            "Quest 3 (10.0.0.5:5555) [saved, online]"
        );
    }

    #[test]
    fn test_candidate_is_endpoint() {
        let candidate = CandidateDevice::live("10.0.0.5", "10.0.0.5", 5555);
        assert!(candidate.is_endpoint("10.0.0.5", 5555));
        assert!(!candidate.is_endpoint("10.0.0.5", 5556));
        assert!(candidate.origin.live);
        assert!(!candidate.origin.from_registry);
    }
}
