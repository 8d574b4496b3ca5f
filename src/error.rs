//! The error taxonomy surfaced through the Tool Surface.
//!
//! `BridgeError` is the one error type every tool returns. `TransportError`
//! and `CodecError` are narrower and get classified into a `BridgeError` at
//! the `Session` boundary, per the propagation policy: codec errors bubble
//! up unchanged, transport errors are classified.

use std::time::Duration;
use uuid::Uuid;

/// Errors raised by the [`crate::transport::Transport`] trait.
#[derive(Debug)]
pub enum TransportError {
    NotFound(String),
    Timeout,
    NotPermitted,
    AdapterBusy,
    NoAdapter,
    LinkLost,
    Btleplug(btleplug::Error),
    Uuid(uuid::Error),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(address) => write!(f, "no peripheral found for address {address}"),
            Self::Timeout => write!(f, "BLE operation timed out"),
            Self::NotPermitted => write!(f, "firmware refused the operation"),
            Self::AdapterBusy => write!(f, "BLE adapter is busy"),
            Self::NoAdapter => write!(f, "no BLE adapter available"),
            Self::LinkLost => write!(f, "BLE link was lost"),
            Self::Btleplug(err) => write!(f, "BLE error: {err}"),
            Self::Uuid(err) => write!(f, "UUID parse error: {err}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Btleplug(err) => Some(err),
            Self::Uuid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<btleplug::Error> for TransportError {
    fn from(value: btleplug::Error) -> Self {
        Self::Btleplug(value)
    }
}

impl From<uuid::Error> for TransportError {
    fn from(value: uuid::Error) -> Self {
        Self::Uuid(value)
    }
}

/// Errors raised by the pure codec functions in [`crate::codec`].
///
/// `Length` covers the `CodecError{expected_len, got_len, what}` contract
/// spec §4.2 specifies for every decoder. `OutOfRange` covers the decoded
/// value falling outside the vendor-documented range (e.g. humidity > 100,
/// pressure outside [260, 1260] hPa), still surfaced as a malformed
/// payload, never silently clamped.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    Length {
        what: &'static str,
        expected_len: usize,
        got_len: usize,
    },
    OutOfRange {
        what: &'static str,
        value: f64,
    },
}

impl CodecError {
    pub fn new(what: &'static str, expected_len: usize, got_len: usize) -> Self {
        Self::Length {
            what,
            expected_len,
            got_len,
        }
    }

    pub fn out_of_range(what: &'static str, value: f64) -> Self {
        Self::OutOfRange { what, value }
    }

    pub fn expected_len(&self) -> usize {
        match self {
            Self::Length { expected_len, .. } => *expected_len,
            Self::OutOfRange { .. } => 0,
        }
    }

    pub fn got_len(&self) -> usize {
        match self {
            Self::Length { got_len, .. } => *got_len,
            Self::OutOfRange { .. } => 0,
        }
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length {
                what,
                expected_len,
                got_len,
            } => write!(
                f,
                "malformed {what} payload: expected {expected_len} bytes, got {got_len}"
            ),
            Self::OutOfRange { what, value } => {
                write!(f, "{what} value {value} is outside the vendor-documented range")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// The unified error kind surfaced through the Tool Surface, per spec §6/§7.
#[derive(Debug)]
pub enum BridgeError {
    NotConnected,
    BusyError,
    Timeout,
    LinkLost,
    InvalidArgument { field: &'static str, reason: String },
    MalformedPayload { uuid: Uuid, length: usize, expected: usize },
    NotPermitted,
    AdapterBusy,
    NotFound(String),
    NotConfigured { required_call: &'static str },
}

impl BridgeError {
    /// The stable `kind` string sent in the MCP error envelope (`{error: {kind, ...}}`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConnected => "NotConnected",
            Self::BusyError => "BusyError",
            Self::Timeout => "Timeout",
            Self::LinkLost => "LinkLost",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::MalformedPayload { .. } => "MalformedPayload",
            Self::NotPermitted => "NotPermitted",
            Self::AdapterBusy => "AdapterBusy",
            Self::NotFound(_) => "NotFound",
            Self::NotConfigured { .. } => "NotConfigured",
        }
    }

    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no peripheral is connected"),
            Self::BusyError => write!(f, "session is busy with another operation"),
            Self::Timeout => write!(f, "operation timed out after retry"),
            Self::LinkLost => write!(f, "BLE link was lost during the operation"),
            Self::InvalidArgument { field, reason } => {
                write!(f, "invalid argument '{field}': {reason}")
            }
            Self::MalformedPayload {
                uuid,
                length,
                expected,
            } => write!(
                f,
                "characteristic {uuid} returned {length} bytes, expected {expected}"
            ),
            Self::NotPermitted => write!(f, "firmware refused the operation"),
            Self::AdapterBusy => write!(f, "BLE adapter is busy"),
            Self::NotFound(address) => write!(f, "no peripheral found for address {address}"),
            Self::NotConfigured { required_call } => {
                write!(f, "motion fusion is not configured; call {required_call} first")
            }
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<CodecError> for BridgeError {
    fn from(value: CodecError) -> Self {
        // Codec errors bubble up unchanged in spirit: we keep the shape but
        // have no characteristic UUID at this layer, so callers that care
        // about `uuid` attach it via `Session::classify_codec_error`.
        Self::MalformedPayload {
            uuid: Uuid::nil(),
            length: value.got_len(),
            expected: value.expected_len(),
        }
    }
}

impl From<TransportError> for BridgeError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::NotFound(address) => Self::NotFound(address),
            TransportError::Timeout => Self::Timeout,
            TransportError::NotPermitted => Self::NotPermitted,
            TransportError::AdapterBusy | TransportError::NoAdapter => Self::AdapterBusy,
            TransportError::LinkLost => Self::LinkLost,
            TransportError::Btleplug(_) | TransportError::Uuid(_) => Self::AdapterBusy,
        }
    }
}

/// Default per-characteristic notification-read timeout (spec §4.4.3).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Retry backoff before a single retry on read/write timeout (spec §4.4.6).
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);
