//! Persisted registry of previously-connected devices
//!
//! Keyed by address: at most one record per address. Persistence is the
//! caller's job (see [`crate::SettingsStore::record_connection`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use adeploy_core::DeviceRecord;

/// Ordered list of known devices, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    records: Vec<DeviceRecord>,
}

impl DeviceRegistry {
    pub fn new(records: Vec<DeviceRecord>) -> Self {
        Self { records }
    }

    /// Insert or refresh the record for `address`, stamped with the current time
    pub fn upsert(&mut self, name: &str, address: &str, port: u16) {
        self.upsert_at(name, address, port, Utc::now());
    }

    /// Insert or refresh the record for `address` with an explicit timestamp.
    ///
    /// An existing record keeps its name; only port and timestamp change.
    pub fn upsert_at(&mut self, name: &str, address: &str, port: u16, at: DateTime<Utc>) {
        let stamp = Some(at.to_rfc3339());
        match self.records.iter_mut().find(|r| r.address == address) {
            Some(record) => {
                record.port = port;
                record.last_connected = stamp;
            }
            None => self.records.push(DeviceRecord {
                name: name.to_string(),
                address: address.to_string(),
                port,
                last_connected: stamp,
            }),
        }
    }

    /// Remove every record with this address; returns how many were removed
    pub fn remove(&mut self, address: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.address != address);
        before - self.records.len()
    }

    /// Change the display label of a known device
    pub fn rename(&mut self, address: &str, name: &str) -> bool {
        match self.records.iter_mut().find(|r| r.address == address) {
            Some(record) => {
                record.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Record with the latest last-connected timestamp.
    ///
    /// Missing or unparsable timestamps rank lowest; ties go to the record
    /// that appears first.
    pub fn most_recent(&self) -> Option<&DeviceRecord> {
        self.records.iter().fold(None, |best, record| match best {
            Some(b) if record.recency_key() <= b.recency_key() => Some(b),
            _ => Some(record),
        })
    }

    /// Records ordered most recent first, stable for ties
    pub fn by_recency(&self) -> Vec<&DeviceRecord> {
        let mut sorted: Vec<&DeviceRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| std::cmp::Reverse(r.recency_key()));
        sorted
    }

    pub fn find(&self, address: &str) -> Option<&DeviceRecord> {
        self.records.iter().find(|r| r.address == address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
