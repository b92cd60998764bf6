//! SSE endpoint: opens a session and streams its server messages.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use rmcp::ServiceExt;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::server::McpServer;
use crate::session::{SessionGuard, SessionId};
use crate::transport::{MESSAGE_PATH, TransportState};

/// Event stream for one session.
///
/// Holds the [`SessionGuard`], so the session leaves the table when the
/// stream ends or the client goes away and the response body is dropped.
pub struct SessionEventStream {
    events: BoxStream<'static, Result<Event, axum::Error>>,
    guard: Option<SessionGuard>,
}

impl Stream for SessionEventStream {
    type Item = Result<Event, axum::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let next = this.events.poll_next_unpin(cx);
        if let Poll::Ready(None) = next {
            if let Some(guard) = this.guard.take() {
                guard.release();
            }
        }
        next
    }
}

/// `GET /sse`.
///
/// Registers a session, tells the client where to post its messages with an
/// `endpoint` event, then forwards every server message as a `message` event.
pub async fn open_sse(
    State(state): State<TransportState>,
) -> Sse<KeepAliveStream<SessionEventStream>> {
    let (inbound_tx, inbound_rx) = mpsc::unbounded::<ClientJsonRpcMessage>();
    let (outbound_tx, outbound_rx) = mpsc::unbounded::<ServerJsonRpcMessage>();

    let handle = state.sessions.open(inbound_tx);
    let session_id = handle.id().clone();
    let guard = SessionGuard::new(&handle, state.sessions.clone());
    info!(%session_id, "SSE connection opened");

    tokio::spawn(serve_session(
        state.server.clone(),
        session_id.clone(),
        outbound_tx,
        inbound_rx,
        handle.close_signal(),
    ));

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{}?sessionId={}", MESSAGE_PATH, session_id));

    let messages = outbound_rx.map(|message| Event::default().event("message").json_data(&message));

    let events = stream::once(async move { Ok::<_, axum::Error>(endpoint) })
        .chain(messages)
        .boxed();

    Sse::new(SessionEventStream {
        events,
        guard: Some(guard),
    })
    .keep_alive(KeepAlive::default())
}

/// Run the MCP service for one session until the client leaves or the
/// session is closed.
async fn serve_session(
    server: McpServer,
    session_id: SessionId,
    outbound: UnboundedSender<ServerJsonRpcMessage>,
    inbound: UnboundedReceiver<ClientJsonRpcMessage>,
    close_signal: CancellationToken,
) {
    let service = match server.serve_with_ct((outbound, inbound), close_signal).await {
        Ok(service) => service,
        Err(e) => {
            warn!(%session_id, error = %e, "session ended before initialization");
            return;
        }
    };

    match service.waiting().await {
        Ok(reason) => debug!(%session_id, ?reason, "session service stopped"),
        Err(e) => warn!(%session_id, error = %e, "session service task failed"),
    }
}
