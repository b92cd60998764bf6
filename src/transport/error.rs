use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::session::{SessionError, SessionId};

/// Body returned when a message names no open session.
pub const SESSION_NOT_FOUND_BODY: &str = "No transport found for sessionId";

/// Client-facing failures of the message route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The `sessionId` was missing, unknown, or already closed.
    SessionNotFound(Option<SessionId>),
    /// The body was not a JSON-RPC client message.
    InvalidMessage(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotFound(Some(id)) => write!(f, "No transport found for session {}", id),
            Self::SessionNotFound(None) => write!(f, "No sessionId supplied"),
            Self::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<SessionError> for GatewayError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) | SessionError::Closed(id) => Self::SessionNotFound(Some(id)),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::SessionNotFound(_) => {
                (StatusCode::BAD_REQUEST, SESSION_NOT_FOUND_BODY).into_response()
            }
            Self::InvalidMessage(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
        }
    }
}
