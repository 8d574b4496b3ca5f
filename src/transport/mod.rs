//! The BLE Transport abstraction (spec §4.3): a thin, non-serializing
//! wrapper over the platform BLE stack. `Session` is the only thing that
//! enforces mutual exclusion; a `Transport` implementation may be called
//! concurrently and must not assume otherwise.

pub mod ble;
/// An in-memory scripted [`Transport`] double used by the scenario tests in
/// `tests/session_scenarios.rs`; kept public so downstream integration
/// tests can reuse it without a mocking-framework dependency.
pub mod mock;

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use uuid::Uuid;

use crate::error::TransportError;

/// A peripheral observed during a scan (spec §3.1). Not retained past the
/// `scan_devices` tool call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPeripheral {
    pub address: String,
    pub name: Option<String>,
    pub rssi: i16,
}

/// One event delivered on a subscribed characteristic's notification stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Notification { uuid: Uuid, value: Vec<u8> },
    LinkLost,
}

pub type NotificationStream = Pin<Box<dyn Stream<Item = TransportEvent> + Send>>;

/// Thin wrapper over the platform BLE stack. Implementors perform no
/// retries, no locking, and no characteristic-policy decisions: all of
/// that discipline lives in [`crate::session::Session`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// An opaque, cloneable handle to a connected peripheral.
    type Link: Clone + Send + Sync;

    async fn scan(&self, timeout: Duration) -> Result<Vec<DiscoveredPeripheral>, TransportError>;

    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Self::Link, TransportError>;

    async fn disconnect(&self, link: &Self::Link) -> Result<(), TransportError>;

    /// Fails with [`TransportError::NotPermitted`] if the characteristic
    /// does not support direct reads; the caller falls back to
    /// [`Transport::subscribe`].
    async fn read_char(&self, link: &Self::Link, uuid: Uuid) -> Result<Vec<u8>, TransportError>;

    async fn write_char(
        &self,
        link: &Self::Link,
        uuid: Uuid,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError>;

    /// Subscribes to `uuid`'s notifications, returning a stream of events
    /// scoped to this one characteristic (link-loss events are delivered on
    /// every outstanding stream for the same link).
    async fn subscribe(
        &self,
        link: &Self::Link,
        uuid: Uuid,
    ) -> Result<NotificationStream, TransportError>;

    /// Idempotent: unsubscribing twice, or from an already-closed link, is
    /// not an error.
    async fn unsubscribe(&self, link: &Self::Link, uuid: Uuid) -> Result<(), TransportError>;
}
