//! MCP bridge exposing a Nordic Thingy:52 BLE peripheral's sensors and
//! actuators as tool calls.
//!
//! The recommended API surface is:
//! - [`session::Session`] for the connection lifecycle and single-client
//!   concurrency discipline
//! - [`transport::Transport`] for BLE I/O, with [`transport::ble::BleTransport`]
//!   as the production backend
//! - [`tools`] for the MCP-facing Tool Surface built on top of a `Session`
//! - [`mcp_server`] to wire the Tool Surface into an `rmcp` server over stdio

pub mod codec;
pub mod error;
pub mod mcp_server;
pub mod sensor;
pub mod session;
pub mod tools;
/// Transport adapters: the `btleplug`-backed production implementation and a
/// scripted test double.
pub mod transport;
pub mod uuids;

pub use error::BridgeError;
pub use session::Session;
