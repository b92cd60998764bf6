use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::session::{SessionHandle, SessionId, SessionStore};

/// Owns the lifetime of one registered session.
///
/// The guard travels with the SSE response stream. Whichever close signal
/// arrives first (explicit [`SessionGuard::release`], stream end, or client
/// disconnect dropping the stream) removes the session; later signals are
/// no-ops.
pub struct SessionGuard {
    id: SessionId,
    close_signal: CancellationToken,
    store: Arc<dyn SessionStore>,
    released: bool,
}

impl SessionGuard {
    pub fn new(handle: &SessionHandle, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id: handle.id().clone(),
            close_signal: handle.close_signal(),
            store,
            released: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Close the session now. Returns `true` if this call removed it.
    pub fn release(mut self) -> bool {
        self.release_once()
    }

    fn release_once(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.close_signal.cancel();

        let removed = self.store.close(&self.id);
        if removed {
            info!(session_id = %self.id, "SSE connection closed");
        }
        removed
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use futures::channel::mpsc;

    #[test]
    fn drop_removes_session_and_cancels() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);
        let signal = handle.close_signal();

        let guard = SessionGuard::new(&handle, store.clone());
        assert_eq!(guard.id(), handle.id());
        drop(guard);

        assert!(store.lookup(handle.id()).is_err());
        assert!(signal.is_cancelled());
    }

    #[test]
    fn competing_close_signals_remove_exactly_once() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);

        let first = SessionGuard::new(&handle, store.clone());
        let second = SessionGuard::new(&handle, store.clone());

        assert!(first.release());
        assert!(!second.release());
        assert!(!store.close(handle.id()));
        assert!(store.is_empty());
    }

    #[test]
    fn release_after_external_close_is_noop() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let (tx, _rx) = mpsc::unbounded();
        let handle = store.open(tx);
        let guard = SessionGuard::new(&handle, store.clone());

        assert!(store.close(handle.id()));
        assert!(!guard.release());
    }
}
