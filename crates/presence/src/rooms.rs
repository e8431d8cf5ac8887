//! Room membership: which connections are currently viewing which chat.

use crate::ConnectionId;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Logical broadcast groups keyed by chat public id. Connections join and
/// leave explicitly; a disconnect discards all memberships implicitly.
#[derive(Debug, Default)]
pub struct RoomMembership {
    rooms: HashMap<String, BTreeSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<String>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the connection to the room. Idempotent.
    pub fn join(&mut self, conn_id: &ConnectionId, chat_id: &str) {
        self.rooms
            .entry(chat_id.to_string())
            .or_default()
            .insert(conn_id.clone());
        self.joined
            .entry(conn_id.clone())
            .or_default()
            .insert(chat_id.to_string());
    }

    pub fn leave(&mut self, conn_id: &ConnectionId, chat_id: &str) {
        if let Some(room) = self.rooms.get_mut(chat_id) {
            room.remove(conn_id);
            if room.is_empty() {
                self.rooms.remove(chat_id);
            }
        }
        if let Some(chats) = self.joined.get_mut(conn_id) {
            chats.remove(chat_id);
            if chats.is_empty() {
                self.joined.remove(conn_id);
            }
        }
    }

    /// Connections currently in the room, empty if none.
    pub fn connections_in(&self, chat_id: &str) -> impl Iterator<Item = &ConnectionId> {
        self.rooms.get(chat_id).into_iter().flatten()
    }

    /// Remove every membership held by the connection.
    pub fn drop_connection(&mut self, conn_id: &ConnectionId) {
        let Some(chats) = self.joined.remove(conn_id) else {
            return;
        };
        for chat_id in chats {
            if let Some(room) = self.rooms.get_mut(&chat_id) {
                room.remove(conn_id);
                if room.is_empty() {
                    self.rooms.remove(&chat_id);
                }
            }
        }
    }
}
