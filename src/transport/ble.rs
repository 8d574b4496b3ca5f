//! `btleplug`-backed [`Transport`] implementation.
//!
//! Grounded directly on the teacher crate's own `transport/ble.rs`: one
//! `Manager`/`Adapter` pair per process, `start_scan` with a `ScanFilter`,
//! `peripheral.connect()` followed by `discover_services()`, and
//! `peripheral.subscribe()` / `peripheral.notifications()` for the
//! composite read. The difference is that this crate's public API is
//! already async end-to-end (there is no blocking `Read`/`Write` facade to
//! bridge), so there is no worker thread: `BleTransport`'s methods are
//! themselves the async implementation `Session` awaits directly.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use uuid::Uuid;

use super::{DiscoveredPeripheral, NotificationStream, Transport, TransportEvent};
use crate::error::TransportError;
use crate::uuids;

/// A connected Thingy:52 peripheral handle. `btleplug::platform::Peripheral`
/// is already a cheap `Clone` (it's a handle into the platform backend), so
/// this is a thin newtype rather than an `Arc` wrapper.
#[derive(Clone)]
pub struct BleLink {
    peripheral: Peripheral,
}

pub struct BleTransport {
    adapter: Adapter,
}

impl BleTransport {
    /// Takes the first BLE adapter the platform reports. The Thingy:52
    /// bridge only ever drives one peripheral at a time (spec §1's
    /// non-goals), so there is no need to expose adapter selection.
    pub async fn first_adapter() -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or(TransportError::NoAdapter)?;
        Ok(Self { adapter })
    }

    async fn find_characteristic(
        peripheral: &Peripheral,
        uuid: Uuid,
    ) -> Result<Characteristic, TransportError> {
        peripheral
            .characteristics()
            .into_iter()
            .find(|ch| ch.uuid == uuid)
            .ok_or(TransportError::NotPermitted)
    }

    async fn connect_inner(&self, address: &str) -> Result<BleLink, TransportError> {
        let peripherals = self.adapter.peripherals().await?;
        let peripheral = peripherals
            .into_iter()
            .find(|p| p.id().to_string() == address)
            .ok_or_else(|| TransportError::NotFound(address.to_string()))?;

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        Ok(BleLink { peripheral })
    }
}

#[async_trait]
impl Transport for BleTransport {
    type Link = BleLink;

    async fn scan(&self, timeout: Duration) -> Result<Vec<DiscoveredPeripheral>, TransportError> {
        let service = uuids::advertised_service();
        self.adapter
            .start_scan(ScanFilter {
                services: vec![service],
            })
            .await?;
        tokio::time::sleep(timeout).await;
        let _ = self.adapter.stop_scan().await;

        let peripherals = self.adapter.peripherals().await?;
        let mut seen = std::collections::HashSet::new();
        let mut discovered = Vec::new();

        for peripheral in peripherals {
            let Some(props) = peripheral.properties().await? else {
                continue;
            };

            let name_matches = props
                .local_name
                .as_deref()
                .is_some_and(|name| name.contains("Thingy"));
            let service_matches = props.services.contains(&service);
            if !name_matches && !service_matches {
                continue;
            }

            let address = peripheral.id().to_string();
            if !seen.insert(address.clone()) {
                continue;
            }

            discovered.push(DiscoveredPeripheral {
                address,
                name: props.local_name,
                rssi: props.rssi.unwrap_or_default(),
            });
        }

        Ok(discovered)
    }

    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Self::Link, TransportError> {
        tokio::time::timeout(timeout, self.connect_inner(address))
            .await
            .map_err(|_| TransportError::Timeout)?
    }

    async fn disconnect(&self, link: &Self::Link) -> Result<(), TransportError> {
        // Idempotent: btleplug returns an error if already disconnected, but
        // that's not a failure worth surfacing (spec §4.3).
        let _ = link.peripheral.disconnect().await;
        Ok(())
    }

    async fn read_char(&self, link: &Self::Link, uuid: Uuid) -> Result<Vec<u8>, TransportError> {
        let characteristic = Self::find_characteristic(&link.peripheral, uuid).await?;
        if !characteristic.properties.contains(CharPropFlags::READ) {
            return Err(TransportError::NotPermitted);
        }
        Ok(link.peripheral.read(&characteristic).await?)
    }

    async fn write_char(
        &self,
        link: &Self::Link,
        uuid: Uuid,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let characteristic = Self::find_characteristic(&link.peripheral, uuid).await?;
        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        Ok(link.peripheral.write(&characteristic, data, write_type).await?)
    }

    async fn subscribe(
        &self,
        link: &Self::Link,
        uuid: Uuid,
    ) -> Result<NotificationStream, TransportError> {
        let characteristic = Self::find_characteristic(&link.peripheral, uuid).await?;
        link.peripheral.subscribe(&characteristic).await?;

        let raw = link.peripheral.notifications().await?;
        let stream = raw.filter_map(move |notification| {
            let matches = notification.uuid == uuid;
            async move {
                matches.then(|| TransportEvent::Notification {
                    uuid: notification.uuid,
                    value: notification.value,
                })
            }
        });
        Ok(Box::pin(stream))
    }

    async fn unsubscribe(&self, link: &Self::Link, uuid: Uuid) -> Result<(), TransportError> {
        let characteristic = Self::find_characteristic(&link.peripheral, uuid).await?;
        // Idempotent: unsubscribing from an already-unsubscribed or
        // disconnected characteristic is not a failure (spec §4.3).
        let _ = link.peripheral.unsubscribe(&characteristic).await;
        Ok(())
    }
}
