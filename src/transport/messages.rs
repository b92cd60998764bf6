//! Message router: forwards client messages into their session.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use rmcp::model::ClientJsonRpcMessage;
use serde::Deserialize;
use tracing::debug;

use crate::session::SessionId;
use crate::transport::{GatewayError, TransportState};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `POST /messages?sessionId=<id>`.
///
/// Replies `202 Accepted` once the message is queued for the session. The
/// JSON-RPC response itself goes out on the session's event stream.
pub async fn post_message(
    State(state): State<TransportState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), GatewayError> {
    let session_id = query
        .session_id
        .map(SessionId::from)
        .ok_or(GatewayError::SessionNotFound(None))?;

    let session = state.sessions.lookup(&session_id).inspect_err(|_| {
        debug!(%session_id, "message for unknown session");
    })?;

    let message: ClientJsonRpcMessage = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::InvalidMessage(e.to_string()))?;

    session.deliver(message)?;
    Ok((StatusCode::ACCEPTED, "Accepted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use tower::ServiceExt;

    use crate::server::McpServer;
    use crate::session::{InMemorySessionStore, SessionStore};
    use crate::tools::ToolRegistry;
    use crate::transport::error::SESSION_NOT_FOUND_BODY;

    fn app(sessions: Arc<dyn SessionStore>) -> Router {
        let server = McpServer::new(Arc::new(ToolRegistry::new()));
        Router::new()
            .route("/messages", post(post_message))
            .with_state(TransportState::new(server, sessions))
    }

    async fn post_body(app: Router, uri: &str, body: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    const PING: &str = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;

    #[tokio::test]
    async fn unknown_session_is_a_bad_request() {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (status, body) = post_body(app(sessions), "/messages?sessionId=nope", PING).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, SESSION_NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn missing_session_id_is_a_bad_request() {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (status, body) = post_body(app(sessions), "/messages", PING).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "No transport found for sessionId");
    }

    #[tokio::test]
    async fn known_session_receives_payload_exactly_once() {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, mut rx) = mpsc::unbounded();
        let handle = sessions.open(tx);
        let uri = format!("/messages?sessionId={}", handle.id());

        let (status, body) = post_body(app(sessions.clone()), &uri, PING).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, "Accepted");

        let delivered = rx.next().await.expect("one message");
        assert_eq!(serde_json::to_value(&delivered).unwrap()["method"], "ping");

        // Nothing else was queued.
        sessions.close(handle.id());
        drop(handle);
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_without_delivery() {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, mut rx) = mpsc::unbounded();
        let handle = sessions.open(tx);
        let uri = format!("/messages?sessionId={}", handle.id());

        let (status, body) = post_body(app(sessions.clone()), &uri, "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Invalid message:"));

        sessions.close(handle.id());
        drop(handle);
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn closed_session_is_reported_as_unknown() {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, _rx) = mpsc::unbounded();
        let handle = sessions.open(tx);
        let uri = format!("/messages?sessionId={}", handle.id());
        sessions.close(handle.id());

        let (status, body) = post_body(app(sessions), &uri, PING).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, SESSION_NOT_FOUND_BODY);
    }
}
