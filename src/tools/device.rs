//! Connection-lifecycle tools: `scan_devices`, `connect_device`,
//! `disconnect_device`, `get_device_status`.

use std::time::Duration;

use serde::Serialize;

use crate::codec::environment::decode_battery;
use crate::error::BridgeError;
use crate::sensor::SensorReading;
use crate::transport::Transport;

use super::ToolSurface;

const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_SCAN_TIMEOUT_SECS: u64 = 1;
const MAX_SCAN_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub address: String,
    pub name: Option<String>,
    pub rssi: i16,
}

#[derive(Debug, Serialize)]
pub struct ConnectResult {
    pub connected: bool,
    pub address: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceStatus {
    pub connected: bool,
    pub address: Option<String>,
    pub name: Option<String>,
    pub battery_percent: Option<u8>,
}

impl<T: Transport> ToolSurface<T> {
    /// Scans for advertising Thingy:52 peripherals for `timeout_secs`
    /// (1..=60, default 10s). Results are not retained beyond the call other
    /// than to let a subsequent `connect_device` resolve the peripheral's
    /// name.
    pub async fn scan_devices(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<Vec<DeviceSummary>, BridgeError> {
        if let Some(secs) = timeout_secs {
            if !(MIN_SCAN_TIMEOUT_SECS..=MAX_SCAN_TIMEOUT_SECS).contains(&secs) {
                return Err(BridgeError::invalid_argument(
                    "timeout_seconds",
                    "must be between 1 and 60",
                ));
            }
        }
        let timeout = timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_SCAN_TIMEOUT);
        let discovered = self.session().scan(timeout).await?;
        Ok(discovered
            .into_iter()
            .map(|p| DeviceSummary {
                address: p.address,
                name: p.name,
                rssi: p.rssi,
            })
            .collect())
    }

    /// Connects to the peripheral at `address`. Rejects with `BusyError` if
    /// a connection attempt or an active session is already in progress.
    pub async fn connect_device(
        &self,
        address: &str,
        timeout_secs: Option<u64>,
    ) -> Result<ConnectResult, BridgeError> {
        if address.trim().is_empty() {
            return Err(BridgeError::invalid_argument("address", "must not be empty"));
        }
        let timeout = timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let snapshot = self.session().connect(address, timeout).await?;
        Ok(ConnectResult {
            connected: snapshot.connected,
            address: snapshot.address,
            name: snapshot.name,
        })
    }

    /// Idempotent: disconnecting an already-disconnected session succeeds.
    pub async fn disconnect_device(&self) -> Result<ConnectResult, BridgeError> {
        self.session().disconnect().await?;
        Ok(ConnectResult {
            connected: false,
            address: None,
            name: None,
        })
    }

    /// Reports the current link state, plus battery level as a
    /// best-effort sub-operation when connected (spec §4.5: a battery read
    /// failure is folded into `battery_percent: None`, not a call failure).
    pub async fn get_device_status(&self) -> DeviceStatus {
        let snapshot = self.session().snapshot();
        let battery_percent = if snapshot.connected {
            match self.session().read_characteristic("battery_level").await {
                Ok(bytes) => match decode_battery(&bytes) {
                    Ok(SensorReading::Battery { percent }) => Some(percent),
                    _ => None,
                },
                Err(_) => None,
            }
        } else {
            None
        };
        DeviceStatus {
            connected: snapshot.connected,
            address: snapshot.address,
            name: snapshot.name,
            battery_percent,
        }
    }
}
