//! Pair / connect / disconnect workflow
//!
//! adb reports pairing and connection results as text and can exit zero on
//! failure, so success is decided by phrases in the output.

use adeploy_adb::devices::split_serial;
use adeploy_adb::{AdbCommand, CommandOutcome, CommandRunner};
use adeploy_core::prelude::*;
use adeploy_core::{serial_for, CandidateDevice, ConnectionState, OperationResult};

use crate::config::SettingsStore;
use crate::discovery;
use crate::inventory::AppInventory;

/// Phrase adb prints after a successful `adb pair`
const PAIRED_PHRASE: &str = "successfully paired";

/// Phrase shared by "connected to" and "already connected to"
const CONNECTED_PHRASE: &str = "connected";

/// Check `adb pair` output for success
pub fn is_pair_success(outcome: &CommandOutcome) -> bool {
    outcome.output_contains(PAIRED_PHRASE)
}

/// Check `adb connect` output for success.
///
/// Matches both "connected to" and "already connected to".
pub fn is_connect_success(outcome: &CommandOutcome) -> bool {
    outcome.output_contains(CONNECTED_PHRASE)
}

/// Tracks the single active connection
#[derive(Debug, Default)]
pub struct ConnectionWorkflow {
    state: ConnectionState,
}

impl ConnectionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Treat `serial` as the active connection without running `adb connect`.
    ///
    /// The adb server outlives this process, so a connection made by an
    /// earlier invocation can be picked up again.
    pub fn adopt(&mut self, serial: impl Into<String>) {
        self.state = ConnectionState::Connected {
            serial: serial.into(),
        };
    }

    /// Pair with a device using the code shown in its wireless debugging screen.
    ///
    /// Pairing does not connect. On success the connect address is prefilled
    /// with the paired address.
    pub async fn pair<R: CommandRunner>(
        &mut self,
        runner: &R,
        store: &mut SettingsStore,
        address: &str,
        port: u16,
        code: &str,
    ) -> OperationResult {
        let address = address.trim();
        let code = code.trim();
        if address.is_empty() || code.is_empty() {
            return OperationResult::failure("Pairing needs an address, a port and a pairing code");
        }

        store.update(|s| {
            s.pair_address = address.to_string();
            s.pair_port = Some(port);
        });

        let previous = std::mem::replace(&mut self.state, ConnectionState::Pairing);
        info!("Pairing with {}", serial_for(address, port));

        let outcome = runner
            .run(&AdbCommand::Pair {
                address: address.to_string(),
                port,
                code: code.to_string(),
            })
            .await;

        if is_pair_success(&outcome) {
            info!("Paired with {}", serial_for(address, port));
            self.state = ConnectionState::Disconnected;
            store.update(|s| s.connect_address = address.to_string());
            OperationResult::success(outcome.output)
        } else {
            warn!("Pairing with {} failed: {}", serial_for(address, port), outcome.output);
            self.state = previous;
            OperationResult::failure(outcome.output)
        }
    }

    /// Connect to a device and remember it in the registry.
    ///
    /// A new successful connect replaces the active serial without
    /// disconnecting the previous one at the adb layer.
    pub async fn connect<R: CommandRunner>(
        &mut self,
        runner: &R,
        store: &mut SettingsStore,
        address: &str,
        port: u16,
    ) -> OperationResult {
        let address = address.trim();
        if address.is_empty() {
            return OperationResult::failure("Connecting needs an address");
        }

        store.update(|s| {
            s.connect_address = address.to_string();
            s.connect_port = port;
        });

        self.state = ConnectionState::Connecting;
        let serial = serial_for(address, port);
        info!("Connecting to {}", serial);

        let outcome = runner
            .run(&AdbCommand::Connect {
                address: address.to_string(),
                port,
            })
            .await;

        if is_connect_success(&outcome) {
            info!("Connected to {}", serial);
            self.state = ConnectionState::Connected { serial };
            let name = store
                .registry()
                .find(address)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| address.to_string());
            store.record_connection(&name, address, port);
            OperationResult::success(outcome.output)
        } else {
            warn!("Connecting to {} failed: {}", serial, outcome.output);
            self.state = ConnectionState::Disconnected;
            OperationResult::failure(outcome.output)
        }
    }

    /// Drop the active connection and rescan.
    ///
    /// The adb disconnect is best-effort; its result is ignored. Cached app
    /// inventory is cleared.
    pub async fn disconnect<R: CommandRunner>(
        &mut self,
        runner: &R,
        store: &SettingsStore,
        inventory: &mut AppInventory,
    ) -> Vec<CandidateDevice> {
        if let Some((address, port)) = self.state.serial().and_then(split_serial) {
            info!("Disconnecting from {}", serial_for(&address, port));
            let outcome = runner.run(&AdbCommand::Disconnect { address, port }).await;
            debug!("disconnect output: {}", outcome.output);
        }

        inventory.clear();
        self.state = ConnectionState::Disconnected;

        discovery::scan(runner, store.registry()).await
    }
}
