//! An in-memory, scripted [`Transport`] double.
//!
//! No mocking-framework dependency: a ten-method trait with this little
//! surface area doesn't need one, matching the teacher crate's own
//! preference for hand-written test doubles over a `mockall`-style derive.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use uuid::Uuid;

use super::{DiscoveredPeripheral, NotificationStream, Transport, TransportEvent};
use crate::error::TransportError;

/// One recorded interaction, in call order, for assertions like "every
/// subscribe is paired with an unsubscribe" (spec §8, property 9) and
/// "the second subscribe starts only after the first unsubscribe
/// completes" (spec §8, scenario F).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Subscribe(Uuid),
    Unsubscribe(Uuid),
    Write { uuid: Uuid, data: Vec<u8>, with_response: bool },
    Connect(String),
    Disconnect,
}

/// What a scripted subscribe-and-wait should produce.
#[derive(Clone)]
enum NotifyOutcome {
    Payload(Vec<u8>),
    LinkLost,
    /// Never delivers; the caller's timeout is expected to fire.
    Never,
}

#[derive(Clone)]
pub struct MockLink {
    pub address: String,
}

#[derive(Default)]
struct Script {
    scan_results: Vec<DiscoveredPeripheral>,
    direct_reads: HashMap<Uuid, Vec<u8>>,
    notifications: HashMap<Uuid, NotifyOutcome>,
}

#[derive(Default)]
pub struct MockTransport {
    script: Mutex<Script>,
    events: Mutex<Vec<MockEvent>>,
    /// Nonzero while a subscribe's stream has been handed out and not yet
    /// unsubscribed; used to catch overlapping composite reads.
    outstanding_subscriptions: Mutex<usize>,
    concurrency_violations: Mutex<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_result(self, peripheral: DiscoveredPeripheral) -> Self {
        self.script.lock().unwrap().scan_results.push(peripheral);
        self
    }

    pub fn with_direct_read(self, uuid: Uuid, bytes: Vec<u8>) -> Self {
        self.script.lock().unwrap().direct_reads.insert(uuid, bytes);
        self
    }

    pub fn with_notification(self, uuid: Uuid, bytes: Vec<u8>) -> Self {
        self.script
            .lock()
            .unwrap()
            .notifications
            .insert(uuid, NotifyOutcome::Payload(bytes));
        self
    }

    pub fn with_link_loss_on(self, uuid: Uuid) -> Self {
        self.script
            .lock()
            .unwrap()
            .notifications
            .insert(uuid, NotifyOutcome::LinkLost);
        self
    }

    pub fn with_silent(self, uuid: Uuid) -> Self {
        self.script
            .lock()
            .unwrap()
            .notifications
            .insert(uuid, NotifyOutcome::Never);
        self
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<MockEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, MockEvent::Write { .. }))
            .collect()
    }

    /// Nonzero if a subscribe ever started while another subscription was
    /// still outstanding on this transport, a serialization failure.
    pub fn concurrency_violations(&self) -> usize {
        *self.concurrency_violations.lock().unwrap()
    }

    fn record(&self, event: MockEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Link = MockLink;

    async fn scan(&self, _timeout: Duration) -> Result<Vec<DiscoveredPeripheral>, TransportError> {
        Ok(self.script.lock().unwrap().scan_results.clone())
    }

    async fn connect(
        &self,
        address: &str,
        _timeout: Duration,
    ) -> Result<Self::Link, TransportError> {
        let known = self
            .script
            .lock()
            .unwrap()
            .scan_results
            .iter()
            .any(|p| p.address == address);
        if !known {
            return Err(TransportError::NotFound(address.to_string()));
        }
        self.record(MockEvent::Connect(address.to_string()));
        Ok(MockLink {
            address: address.to_string(),
        })
    }

    async fn disconnect(&self, _link: &Self::Link) -> Result<(), TransportError> {
        self.record(MockEvent::Disconnect);
        Ok(())
    }

    async fn read_char(&self, _link: &Self::Link, uuid: Uuid) -> Result<Vec<u8>, TransportError> {
        self.script
            .lock()
            .unwrap()
            .direct_reads
            .get(&uuid)
            .cloned()
            .ok_or(TransportError::NotPermitted)
    }

    async fn write_char(
        &self,
        _link: &Self::Link,
        uuid: Uuid,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        self.record(MockEvent::Write {
            uuid,
            data: data.to_vec(),
            with_response,
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        _link: &Self::Link,
        uuid: Uuid,
    ) -> Result<NotificationStream, TransportError> {
        {
            let mut outstanding = self.outstanding_subscriptions.lock().unwrap();
            if *outstanding > 0 {
                *self.concurrency_violations.lock().unwrap() += 1;
            }
            *outstanding += 1;
        }
        self.record(MockEvent::Subscribe(uuid));

        let outcome = self
            .script
            .lock()
            .unwrap()
            .notifications
            .get(&uuid)
            .cloned_or_never();

        let stream = match outcome {
            NotifyOutcome::Payload(value) => {
                stream::once(async move { TransportEvent::Notification { uuid, value } }).boxed()
            }
            NotifyOutcome::LinkLost => stream::once(async move { TransportEvent::LinkLost }).boxed(),
            NotifyOutcome::Never => stream::pending().boxed(),
        };

        Ok(stream)
    }

    async fn unsubscribe(&self, _link: &Self::Link, uuid: Uuid) -> Result<(), TransportError> {
        {
            let mut outstanding = self.outstanding_subscriptions.lock().unwrap();
            *outstanding = outstanding.saturating_sub(1);
        }
        self.record(MockEvent::Unsubscribe(uuid));
        Ok(())
    }
}

trait OptionNotifyOutcomeExt {
    fn cloned_or_never(self) -> NotifyOutcome;
}

impl OptionNotifyOutcomeExt for Option<&NotifyOutcome> {
    fn cloned_or_never(self) -> NotifyOutcome {
        self.cloned().unwrap_or(NotifyOutcome::Never)
    }
}
