//! Session table: maps session identifiers to open connections.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use futures::channel::mpsc::UnboundedSender;
use rmcp::model::ClientJsonRpcMessage;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::session::SessionId;

/// Sending half of a session's inbound (client to server) message channel.
pub type ClientMessageSender = UnboundedSender<ClientJsonRpcMessage>;

/// Errors produced by session lookups and deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No open session is registered under this identifier.
    NotFound(SessionId),
    /// The session was found but its connection has already shut down.
    Closed(SessionId),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Session not found: {}", id),
            Self::Closed(id) => write!(f, "Session closed: {}", id),
        }
    }
}

impl std::error::Error for SessionError {}

/// A registered session: the connection to forward messages into plus its
/// close signal.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    connection: ClientMessageSender,
    close_signal: CancellationToken,
}

impl SessionHandle {
    fn new(id: SessionId, connection: ClientMessageSender) -> Self {
        Self {
            id,
            connection,
            close_signal: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Token that is cancelled when the session closes.
    pub fn close_signal(&self) -> CancellationToken {
        self.close_signal.clone()
    }

    /// Forward one client message into the session's dispatcher.
    pub fn deliver(&self, message: ClientJsonRpcMessage) -> Result<(), SessionError> {
        if self.close_signal.is_cancelled() {
            return Err(SessionError::Closed(self.id.clone()));
        }
        self.connection
            .unbounded_send(message)
            .map_err(|_| SessionError::Closed(self.id.clone()))
    }
}

/// Storage for open sessions.
///
/// Implementations must be safe to call from any task: connection open,
/// close and message routing race across independent connections.
pub trait SessionStore: Send + Sync {
    /// Register a new connection under a freshly generated identifier.
    fn open(&self, connection: ClientMessageSender) -> SessionHandle;

    /// Find the session registered under `id`.
    fn lookup(&self, id: &SessionId) -> Result<SessionHandle, SessionError>;

    /// Remove the session and fire its close signal.
    ///
    /// Removing an absent identifier is a no-op. Returns `true` only for the
    /// call that actually removed the entry.
    fn close(&self, id: &SessionId) -> bool;

    /// Number of open sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session table guarded by a synchronous lock.
///
/// The lock is never held across an await point, and `close` is called from
/// `Drop`, so a blocking lock is the right fit here.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn open(&self, connection: ClientMessageSender) -> SessionHandle {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let mut id = SessionId::generate();
        while sessions.contains_key(&id) {
            id = SessionId::generate();
        }

        let handle = SessionHandle::new(id.clone(), connection);
        sessions.insert(id, handle.clone());
        debug!(session_id = %handle.id(), open_sessions = sessions.len(), "session registered");
        handle
    }

    fn lookup(&self, id: &SessionId) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    fn close(&self, id: &SessionId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        match removed {
            Some(handle) => {
                handle.close_signal.cancel();
                debug!(session_id = %id, "session removed");
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::channel::mpsc;

    fn ping(id: i64) -> ClientJsonRpcMessage {
        serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "ping"
        }))
        .expect("valid ping")
    }

    #[test]
    fn open_then_lookup_succeeds() {
        let store = InMemorySessionStore::new();
        let (tx, _rx) = mpsc::unbounded();

        let handle = store.open(tx);
        let found = store.lookup(handle.id()).expect("session registered");

        assert_eq!(found.id(), handle.id());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn open_never_reuses_a_live_identifier() {
        let store = InMemorySessionStore::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..64 {
            let (tx, _rx) = mpsc::unbounded();
            assert!(ids.insert(store.open(tx).id().clone()));
        }
        assert_eq!(store.len(), 64);
    }

    #[test]
    fn lookup_after_close_is_not_found() {
        let store = InMemorySessionStore::new();
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);

        assert!(store.close(handle.id()));

        assert_eq!(
            store.lookup(handle.id()).unwrap_err(),
            SessionError::NotFound(handle.id().clone())
        );
        assert!(store.is_empty());
    }

    #[test]
    fn close_is_idempotent_and_fires_signal_once() {
        let store = InMemorySessionStore::new();
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);
        let signal = handle.close_signal();

        assert!(store.close(handle.id()));
        assert!(!store.close(handle.id()));
        assert!(!store.close(&SessionId::from("never-opened")));
        assert!(signal.is_cancelled());
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let store = InMemorySessionStore::new();
        let err = store.lookup(&SessionId::from("missing")).unwrap_err();
        assert_eq!(err.to_string(), "Session not found: missing");
    }

    #[tokio::test]
    async fn deliver_forwards_into_connection() {
        let store = InMemorySessionStore::new();
        let (tx, mut rx) = mpsc::unbounded();
        let handle = store.open(tx);

        handle.deliver(ping(7)).expect("delivered");

        let received = rx.next().await.expect("message forwarded");
        assert_eq!(
            serde_json::to_value(&received).unwrap()["id"],
            serde_json::json!(7)
        );
    }

    #[test]
    fn deliver_after_close_reports_closed() {
        let store = InMemorySessionStore::new();
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);
        store.close(handle.id());

        assert!(handle.close_signal().is_cancelled());
        assert_eq!(
            handle.deliver(ping(1)).unwrap_err(),
            SessionError::Closed(handle.id().clone())
        );
    }

    #[test]
    fn deliver_to_dropped_receiver_reports_closed() {
        let store = InMemorySessionStore::new();
        let (tx, rx) = mpsc::unbounded();
        let handle = store.open(tx);
        drop(rx);

        assert!(matches!(
            handle.deliver(ping(1)),
            Err(SessionError::Closed(_))
        ));
    }
}
