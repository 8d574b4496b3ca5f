//! The connection lifecycle state machine and single-client concurrency
//! discipline (spec §4.4). This is the component that makes the Thingy:52
//! protocol usable correctly: exactly one active link, exactly one
//! outstanding GATT transaction on it at a time, and a notification-based
//! read pattern for the many characteristics that refuse direct reads.
//!
//! Spec §9's redesign direction applies directly here: "Global singleton
//! client → Session as an owned value." There is no module-level client;
//! callers construct a `Session` and thread it through explicitly (the Tool
//! Surface in `src/tools` holds an `Arc<Session<_>>`, never ambient state).

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::codec::motion::{encode_motion_config, MotionFrequencies};
use crate::error::{BridgeError, TransportError, DEFAULT_READ_TIMEOUT, RETRY_BACKOFF};
use crate::transport::{DiscoveredPeripheral, Transport, TransportEvent};
use crate::uuids::{self, ReadPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

struct ConnectedLink<L> {
    link: L,
    address: String,
    name: Option<String>,
}

struct SessionState<L> {
    link_state: LinkState,
    connected: Option<ConnectedLink<L>>,
    motion_configured: bool,
    /// UUIDs of peripherals seen by the last `scan`, so `connect` can report
    /// a name without a second round-trip.
    known_names: HashMap<String, Option<String>>,
    /// Belt-and-braces single-slot waiter tracking (spec §4.4.3 step 3).
    /// Structurally unreachable given `op_lock` serializes every composite
    /// operation, but checked anyway.
    active_waiter: Option<Uuid>,
}

impl<L> Default for SessionState<L> {
    fn default() -> Self {
        Self {
            link_state: LinkState::Disconnected,
            connected: None,
            motion_configured: false,
            known_names: HashMap::new(),
            active_waiter: None,
        }
    }
}

/// A snapshot of the current connection, for `get_device_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnapshot {
    pub connected: bool,
    pub address: Option<String>,
    pub name: Option<String>,
}

/// Owns the single active BLE link and serializes all operations on it.
pub struct Session<T: Transport> {
    /// `Arc`-wrapped so tests can retain a handle to a [`crate::transport::mock::MockTransport`]
    /// after constructing the `Session` around it, to inspect recorded calls.
    transport: Arc<T>,
    state: SyncMutex<SessionState<T::Link>>,
    /// Guards every Transport call on the active link, held across the
    /// suspension points inside a composite operation (spec §5).
    op_lock: AsyncMutex<()>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            state: SyncMutex::new(SessionState::default()),
            op_lock: AsyncMutex::new(()),
        }
    }

    /// Exposes the underlying Transport, primarily so tests can assert on a
    /// [`crate::transport::mock::MockTransport`]'s recorded call log.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        let state = self.state.lock().unwrap();
        LinkSnapshot {
            connected: matches!(state.link_state, LinkState::Connected),
            address: state.connected.as_ref().map(|c| c.address.clone()),
            name: state.connected.as_ref().and_then(|c| c.name.clone()),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state.lock().unwrap().link_state, LinkState::Connected)
    }

    /// Scan does not touch the link and is not gated by `op_lock`: it may
    /// run concurrently with, or be rejected independently of, a connected
    /// session (spec §5's `AdapterBusy` carve-out).
    pub async fn scan(&self, timeout: Duration) -> Result<Vec<DiscoveredPeripheral>, BridgeError> {
        let discovered = self.transport.scan(timeout).await?;
        let mut state = self.state.lock().unwrap();
        for peripheral in &discovered {
            state
                .known_names
                .insert(peripheral.address.clone(), peripheral.name.clone());
        }
        Ok(discovered)
    }

    /// `Disconnected → Connecting` is a fast, non-suspending transition
    /// check, independent of `op_lock`: a `connect` in flight must reject a
    /// second `connect` immediately with `BusyError`, not queue behind
    /// whatever `op_lock` happens to be serializing.
    pub async fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<LinkSnapshot, BridgeError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.link_state != LinkState::Disconnected {
                return Err(BridgeError::BusyError);
            }
            state.link_state = LinkState::Connecting;
        }

        match self.transport.connect(address, timeout).await {
            Ok(link) => {
                let mut state = self.state.lock().unwrap();
                let name = state.known_names.get(address).cloned().flatten();
                state.connected = Some(ConnectedLink {
                    link,
                    address: address.to_string(),
                    name: name.clone(),
                });
                state.link_state = LinkState::Connected;
                state.motion_configured = false;
                Ok(LinkSnapshot {
                    connected: true,
                    address: Some(address.to_string()),
                    name,
                })
            }
            Err(err) => {
                let mut state = self.state.lock().unwrap();
                state.link_state = LinkState::Disconnected;
                Err(err.into())
            }
        }
    }

    /// Idempotent on an already-disconnected session.
    pub async fn disconnect(&self) -> Result<(), BridgeError> {
        let (_guard, link) = match self.begin_operation().await {
            Ok(v) => v,
            Err(BridgeError::NotConnected) => return Ok(()),
            Err(other) => return Err(other),
        };
        let _ = self.transport.disconnect(&link).await;
        self.reset_to_disconnected();
        Ok(())
    }

    /// Acquires `op_lock` and returns a clone of the active link, or
    /// `NotConnected` if there isn't one. Every operation that touches the
    /// Transport starts here (spec §4.4.1/§4.4.2).
    async fn begin_operation(
        &self,
    ) -> Result<(tokio::sync::MutexGuard<'_, ()>, T::Link), BridgeError> {
        let guard = self.op_lock.lock().await;
        let state = self.state.lock().unwrap();
        match (&state.link_state, &state.connected) {
            (LinkState::Connected, Some(connected)) => Ok((guard, connected.link.clone())),
            _ => Err(BridgeError::NotConnected),
        }
    }

    fn reset_to_disconnected(&self) {
        let mut state = self.state.lock().unwrap();
        state.link_state = LinkState::Disconnected;
        state.connected = None;
        state.motion_configured = false;
        state.active_waiter = None;
    }

    /// Reads a characteristic by its symbolic registry name, choosing
    /// direct-read-then-fallback or always-notify per the characteristic's
    /// policy (spec §4.4.3), with one retry on timeout (spec §4.4.6).
    pub async fn read_characteristic(&self, name: &'static str) -> Result<Vec<u8>, BridgeError> {
        let registry = uuids::characteristic(name)
            .ok_or_else(|| BridgeError::invalid_argument("name", format!("unknown characteristic '{name}'")))?;
        let (_guard, link) = self.begin_operation().await?;

        if registry.read_policy == ReadPolicy::DirectThenNotify {
            match self.transport.read_char(&link, registry.uuid).await {
                Ok(bytes) => return Ok(bytes),
                Err(TransportError::NotPermitted) => { /* fall through to notify-read */ }
                Err(TransportError::Timeout) => {
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    return self
                        .transport
                        .read_char(&link, registry.uuid)
                        .await
                        .map_err(BridgeError::from);
                }
                Err(other) => return Err(other.into()),
            }
        }

        match self
            .notify_read(&link, registry.uuid, DEFAULT_READ_TIMEOUT)
            .await
        {
            Err(BridgeError::Timeout) => {
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.notify_read(&link, registry.uuid, DEFAULT_READ_TIMEOUT)
                    .await
            }
            other => other,
        }
    }

    /// Like [`Session::read_characteristic`] but always waits the full
    /// timeout for a notification rather than retrying on timeout. Used
    /// only by `read_tap_event`, where a timeout is an expected "no tap
    /// happened" outcome rather than a transient failure (spec §4.5).
    pub async fn read_characteristic_no_retry(
        &self,
        name: &'static str,
        timeout: Duration,
    ) -> Result<Vec<u8>, BridgeError> {
        let registry = uuids::characteristic(name)
            .ok_or_else(|| BridgeError::invalid_argument("name", format!("unknown characteristic '{name}'")))?;
        let (_guard, link) = self.begin_operation().await?;
        self.notify_read(&link, registry.uuid, timeout).await
    }

    /// The composite subscribe → wait-for-first-notification → unsubscribe
    /// operation (spec §4.4.3). `op_lock` is already held by the caller;
    /// cleanup (unsubscribe, waiter removal) runs on every exit path,
    /// including timeout.
    async fn notify_read(
        &self,
        link: &T::Link,
        uuid: Uuid,
        timeout: Duration,
    ) -> Result<Vec<u8>, BridgeError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.active_waiter.is_some() {
                return Err(BridgeError::BusyError);
            }
            state.active_waiter = Some(uuid);
        }

        let subscribe_result = self.transport.subscribe(link, uuid).await;
        let outcome = match subscribe_result {
            Ok(mut stream) => {
                let waited = tokio::time::timeout(timeout, stream.next()).await;
                match waited {
                    Ok(Some(TransportEvent::Notification { value, .. })) => Ok(value),
                    Ok(Some(TransportEvent::LinkLost)) | Ok(None) => {
                        self.reset_to_disconnected();
                        Err(BridgeError::LinkLost)
                    }
                    Err(_elapsed) => Err(BridgeError::Timeout),
                }
            }
            Err(err) => Err(err.into()),
        };

        // Unconditional cleanup: unsubscribe and clear the waiter on every
        // exit path, success or failure (spec §3.3's invariant).
        let _ = self.transport.unsubscribe(link, uuid).await;
        {
            let mut state = self.state.lock().unwrap();
            state.active_waiter = None;
        }

        outcome
    }

    /// The actuation path (spec §4.4.4): acquire `op_lock`, verify
    /// Connected, write, release. One retry on write timeout (spec §4.4.6).
    pub async fn write_characteristic(
        &self,
        name: &'static str,
        bytes: &[u8],
        with_response: bool,
    ) -> Result<(), BridgeError> {
        let registry = uuids::characteristic(name)
            .ok_or_else(|| BridgeError::invalid_argument("name", format!("unknown characteristic '{name}'")))?;
        let (_guard, link) = self.begin_operation().await?;

        match self
            .transport
            .write_char(&link, registry.uuid, bytes, with_response)
            .await
        {
            Ok(()) => Ok(()),
            Err(TransportError::Timeout) => {
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.transport
                    .write_char(&link, registry.uuid, bytes, with_response)
                    .await
                    .map_err(BridgeError::from)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Writes the Motion Service configuration record. Idempotent: callers
    /// may call this as often as they like.
    pub async fn configure_motion(&self, frequencies: MotionFrequencies) -> Result<(), BridgeError> {
        let bytes = encode_motion_config(&frequencies);
        self.write_characteristic("motion_config", &bytes, false)
            .await?;
        self.state.lock().unwrap().motion_configured = true;
        Ok(())
    }

    /// Auto-configure-on-first-use policy (spec §4.4.5, Open Question
    /// resolved in SPEC_FULL.md §4.4): writes default motion frequencies
    /// the first time any fusion-output tool is invoked, memoized after.
    pub async fn ensure_motion_configured(&self) -> Result<(), BridgeError> {
        if self.state.lock().unwrap().motion_configured {
            return Ok(());
        }
        self.configure_motion(MotionFrequencies::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::uuids;

    fn session_with(transport: MockTransport) -> Session<MockTransport> {
        Session::new(transport)
    }

    #[tokio::test]
    async fn connect_requires_prior_scan_to_know_address() {
        let transport = MockTransport::new();
        let session = session_with(transport);
        let result = session
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn scan_then_connect_succeeds() {
        let transport = MockTransport::new().with_scan_result(DiscoveredPeripheral {
            address: "AA:BB:CC:DD:EE:FF".into(),
            name: Some("Thingy".into()),
            rssi: -55,
        });
        let session = session_with(transport);
        session.scan(Duration::from_secs(1)).await.unwrap();
        let snapshot = session
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(snapshot.address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(snapshot.name.as_deref(), Some("Thingy"));
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn connect_while_connecting_is_rejected_with_busy() {
        // A second connect while already Connected (not just Connecting) is
        // the observable case we can assert without racing two tasks.
        let transport = MockTransport::new().with_scan_result(DiscoveredPeripheral {
            address: "AA:BB:CC:DD:EE:FF".into(),
            name: None,
            rssi: -60,
        });
        let session = session_with(transport);
        session.scan(Duration::from_secs(1)).await.unwrap();
        session
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await
            .unwrap();
        let second = session
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .await;
        assert!(matches!(second, Err(BridgeError::BusyError)));
    }

    #[tokio::test]
    async fn read_before_connect_returns_not_connected() {
        let session = session_with(MockTransport::new());
        let result = session.read_characteristic("temperature").await;
        assert!(matches!(result, Err(BridgeError::NotConnected)));
    }

    #[tokio::test]
    async fn notify_read_pairs_subscribe_with_unsubscribe() {
        let transport = MockTransport::new()
            .with_scan_result(DiscoveredPeripheral {
                address: "AA".into(),
                name: None,
                rssi: -50,
            })
            .with_notification(uuids::TEMPERATURE, vec![0x17, 0x32]);
        let session = session_with(transport);
        session.scan(Duration::from_secs(1)).await.unwrap();
        session.connect("AA", Duration::from_secs(1)).await.unwrap();
        let bytes = session.read_characteristic("temperature").await.unwrap();
        assert_eq!(bytes, vec![0x17, 0x32]);
    }

    #[tokio::test]
    async fn link_loss_during_read_disconnects_session() {
        let transport = MockTransport::new()
            .with_scan_result(DiscoveredPeripheral {
                address: "AA".into(),
                name: None,
                rssi: -50,
            })
            .with_link_loss_on(uuids::HUMIDITY);
        let session = session_with(transport);
        session.scan(Duration::from_secs(1)).await.unwrap();
        session.connect("AA", Duration::from_secs(1)).await.unwrap();

        let result = session.read_characteristic("humidity").await;
        assert!(matches!(result, Err(BridgeError::LinkLost)));
        assert!(!session.is_connected());

        let after = session.read_characteristic("temperature").await;
        assert!(matches!(after, Err(BridgeError::NotConnected)));
    }
}
