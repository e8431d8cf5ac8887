//! The presence hub: a transport-free core combining the connection
//! registry and room membership, producing outbound envelopes for the
//! gateway shell to dispatch.

use crate::events::{Envelope, ServerEvent};
use crate::registry::{ConnectionRegistry, PresenceTransition};
use crate::rooms::RoomMembership;
use crate::ConnectionId;
use parley_database::{Chat, Message};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Process-wide presence and routing state. Created once at startup and
/// injected into handlers; every operation is a plain state mutation that
/// returns the events to deliver, so the core tests without a transport.
#[derive(Debug, Default)]
pub struct PresenceHub {
    registry: ConnectionRegistry,
    rooms: RoomMembership,
    owners: HashMap<ConnectionId, String>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport connection opened. Authenticated connections are
    /// registered and get the one-time online-users snapshot; a presence
    /// broadcast goes out only when the user crosses offline→online.
    /// Anonymous connections are tolerated and produce nothing.
    pub fn connect(&mut self, conn_id: ConnectionId, user_id: Option<&str>) -> Vec<Envelope> {
        let Some(user_id) = user_id else {
            debug!(conn_id = %conn_id, "anonymous connection opened");
            return Vec::new();
        };

        let transition = self.registry.register(user_id, conn_id.clone());
        self.owners.insert(conn_id.clone(), user_id.to_string());
        debug!(conn_id = %conn_id, user_id = %user_id, "connection registered");

        let mut envelopes = Vec::new();
        if transition == Some(PresenceTransition::Online) {
            envelopes.push(Envelope::broadcast(ServerEvent::UserStatus {
                user_id: user_id.to_string(),
                is_online: true,
            }));
        }
        envelopes.push(Envelope::to_connection(
            conn_id,
            ServerEvent::OnlineUsers {
                users: self.registry.online_users(),
            },
        ));
        envelopes
    }

    /// A transport connection closed. Room memberships are discarded
    /// implicitly; the offline broadcast fires only when this was the
    /// user's last connection.
    pub fn disconnect(&mut self, conn_id: &ConnectionId) -> Vec<Envelope> {
        self.rooms.drop_connection(conn_id);

        let Some(user_id) = self.owners.remove(conn_id) else {
            return Vec::new();
        };

        debug!(conn_id = %conn_id, user_id = %user_id, "connection unregistered");

        match self.registry.unregister(&user_id, conn_id) {
            Some(PresenceTransition::Offline) => {
                vec![Envelope::broadcast(ServerEvent::UserStatus {
                    user_id,
                    is_online: false,
                })]
            }
            _ => Vec::new(),
        }
    }

    pub fn join_chat(&mut self, conn_id: &ConnectionId, chat_id: &str) {
        debug!(conn_id = %conn_id, chat_id = %chat_id, "connection joined chat room");
        self.rooms.join(conn_id, chat_id);
    }

    pub fn leave_chat(&mut self, conn_id: &ConnectionId, chat_id: &str) {
        debug!(conn_id = %conn_id, chat_id = %chat_id, "connection left chat room");
        self.rooms.leave(conn_id, chat_id);
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.registry.is_online(user_id)
    }

    /// Fan a persisted message out to its audience:
    /// 1. every connection currently in the chat's room, and
    /// 2. every connection of every participant other than the sender
    ///    (the badge-count fallback for users not viewing this chat).
    /// Targets are deduplicated and the sender's own connections are
    /// excluded; the sender already holds the message from the REST
    /// response. Recipients with no connections are skipped silently.
    pub fn route_new_message(&self, message: &Message, chat: &Chat) -> Vec<Envelope> {
        let sender_conns: BTreeSet<&ConnectionId> = self
            .registry
            .connections_for(&message.sender_id)
            .collect();

        let mut targets: BTreeSet<ConnectionId> = self
            .rooms
            .connections_in(&chat.public_id)
            .filter(|conn| !sender_conns.contains(conn))
            .cloned()
            .collect();

        for recipient in chat.recipients_of(&message.sender_id) {
            targets.extend(self.registry.connections_for(recipient).cloned());
        }

        debug!(
            chat_id = %chat.public_id,
            message_id = %message.public_id,
            targets = targets.len(),
            "routing new message"
        );

        targets
            .into_iter()
            .map(|conn_id| {
                Envelope::to_connection(
                    conn_id,
                    ServerEvent::NewMessage {
                        message: message.clone(),
                    },
                )
            })
            .collect()
    }

    /// One batched seen receipt to every connection of the given recipients
    /// (the senders of the transitioned messages). An empty id list means the
    /// mark-seen selected nothing and no notification goes out.
    pub fn notify_seen(
        &self,
        chat_id: &str,
        seen_by: &str,
        message_ids: Vec<String>,
        recipients: &[&str],
    ) -> Vec<Envelope> {
        if message_ids.is_empty() {
            return Vec::new();
        }

        let targets: BTreeSet<ConnectionId> = recipients
            .iter()
            .flat_map(|recipient| self.registry.connections_for(recipient).cloned())
            .collect();

        let event = ServerEvent::MessagesSeen {
            chat_id: chat_id.to_string(),
            seen_by: seen_by.to_string(),
            message_ids,
        };

        targets
            .into_iter()
            .map(|conn_id| Envelope::to_connection(conn_id, event.clone()))
            .collect()
    }
}
