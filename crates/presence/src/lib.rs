//! # Parley Presence Crate
//!
//! The real-time core of the chat backend: mapping online users to live
//! transport connections, tracking which connections view which chat, and
//! fanning persisted messages and seen receipts out to the right sockets.
//!
//! The crate is transport-free. Every operation on [`PresenceHub`] mutates
//! in-memory state and returns [`Envelope`]s; the gateway owns the sockets
//! and dispatches envelopes best-effort. Presence is advisory: there is no
//! retry and no delivery guarantee over the socket layer.

pub mod events;
pub mod hub;
pub mod registry;
pub mod rooms;

pub use events::{Envelope, ServerEvent, Target};
pub use hub::PresenceHub;
pub use registry::{ConnectionRegistry, PresenceTransition};
pub use rooms::RoomMembership;

use serde::{Deserialize, Serialize};

/// Identifier of one live transport session (one socket).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Freshly generated id for a newly accepted connection.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
