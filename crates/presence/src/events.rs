//! Outbound transport events and their delivery targets.

use crate::ConnectionId;
use parley_database::Message;
use serde::{Deserialize, Serialize};

/// Events pushed to clients over the socket. Tag and field names match the
/// wire protocol the frontend listens on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Presence change broadcast to everyone.
    #[serde(rename_all = "camelCase")]
    UserStatus { user_id: String, is_online: bool },
    /// One-time snapshot pushed to a connection on handshake.
    OnlineUsers { users: Vec<String> },
    /// A message was persisted in a chat the target cares about.
    NewMessage { message: Message },
    /// Batched seen receipt for a whole chat.
    #[serde(rename_all = "camelCase")]
    MessagesSeen {
        chat_id: String,
        seen_by: String,
        message_ids: Vec<String>,
    },
}

/// Where an event should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Connection(ConnectionId),
    Broadcast,
}

/// One outbound event paired with its target. The hub produces envelopes;
/// the transport shell owns the sockets and dispatches them best-effort.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub target: Target,
    pub event: ServerEvent,
}

impl Envelope {
    pub fn to_connection(conn_id: ConnectionId, event: ServerEvent) -> Self {
        Self {
            target: Target::Connection(conn_id),
            event,
        }
    }

    pub fn broadcast(event: ServerEvent) -> Self {
        Self {
            target: Target::Broadcast,
            event,
        }
    }
}
