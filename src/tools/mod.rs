//! The Tool Surface (spec §4.5): the MCP-facing operations built on top of a
//! [`Session`]. Every function here is a thin translation layer (argument
//! validation plus a serializable result shape) over `Session`'s connection
//! lifecycle and characteristic I/O. None of these functions touch a
//! `Transport` directly.

pub mod actuation;
pub mod device;
pub mod environment;
pub mod motion;

use std::sync::Arc;

use crate::session::Session;
use crate::transport::Transport;

/// Holds the single [`Session`] every tool function operates against.
/// Cloneable and cheap: it's just an `Arc` handle, so the MCP server can
/// hand a copy to each tool-call dispatch without extra locking of its own.
#[derive(Clone)]
pub struct ToolSurface<T: Transport> {
    session: Arc<Session<T>>,
}

impl<T: Transport> ToolSurface<T> {
    pub fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }
}
