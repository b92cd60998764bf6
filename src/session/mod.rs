//! Session bookkeeping for long-lived SSE connections.
//!
//! A session binds one open `GET /sse` stream to an identifier so that
//! subsequent `POST /messages` requests can be routed to it. Sessions live
//! only as long as their stream and are never resumed.

mod guard;
mod id;
mod store;

pub use guard::SessionGuard;
pub use id::SessionId;
pub use store::{
    ClientMessageSender, InMemorySessionStore, SessionError, SessionHandle, SessionStore,
};
