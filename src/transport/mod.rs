//! HTTP+SSE transport for MCP sessions.
//!
//! `GET /sse` opens a session and streams server messages back; `POST
//! /messages?sessionId=<id>` delivers client messages into that session.

mod error;
mod messages;
mod sse;


use std::sync::Arc;

use crate::server::McpServer;
use crate::session::SessionStore;

pub use error::GatewayError;
pub use messages::{MessageQuery, post_message};
pub use sse::{SessionEventStream, open_sse};

/// Route that opens the long-lived event stream.
pub const SSE_PATH: &str = "/sse";
/// Route that accepts client messages for an open session.
pub const MESSAGE_PATH: &str = "/messages";

/// Shared state for the transport routes.
#[derive(Clone)]
pub struct TransportState {
    pub server: McpServer,
    pub sessions: Arc<dyn SessionStore>,
}

impl TransportState {
    pub fn new(server: McpServer, sessions: Arc<dyn SessionStore>) -> Self {
        Self { server, sessions }
    }
}
