//! Discovery: merge the registry with devices adb currently reports
//!
//! Each call produces a fresh snapshot; callers re-run [`scan`] to refresh.

use adeploy_adb::{list_reporting_devices, CommandRunner};
use adeploy_core::prelude::*;
use adeploy_core::CandidateDevice;

use crate::registry::DeviceRegistry;

/// Build the candidate list for one discovery pass.
///
/// Registry records come first, most recent first. Devices reported live by
/// `adb devices` are then appended unless their (address, port) is already
/// present, in which case the existing candidate is marked live. A failing
/// list command degrades to registry-only results.
pub async fn scan<R: CommandRunner>(runner: &R, registry: &DeviceRegistry) -> Vec<CandidateDevice> {
    let mut candidates: Vec<CandidateDevice> = registry
        .by_recency()
        .into_iter()
        .map(CandidateDevice::from_record)
        .collect();

    match list_reporting_devices(runner).await {
        Ok(reporting) => {
            for device in reporting {
                match candidates
                    .iter_mut()
                    .find(|c| c.is_endpoint(&device.address, device.port))
                {
                    Some(existing) => existing.origin.live = true,
                    None => candidates.push(CandidateDevice::live(
                        device.serial.clone(),
                        device.address,
                        device.port,
                    )),
                }
            }
        }
        Err(e) => {
            warn!("Device listing failed, showing saved devices only: {}", e);
        }
    }

    info!("Discovery found {} candidate devices", candidates.len());
    candidates
}
