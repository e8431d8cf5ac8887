//! The socket gateway: owns the per-connection outbound channels and the
//! presence hub, and dispatches the hub's envelopes to live connections.

use std::collections::HashMap;

use parley_database::{Chat, Message};
use parley_presence::{ConnectionId, Envelope, PresenceHub, ServerEvent, Target};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Process-wide socket state. The hub decides who gets what; this type
/// owns the actual channels. Delivery is best-effort: a send to a closed
/// connection is dropped silently.
#[derive(Default)]
pub struct SocketGateway {
    hub: RwLock<PresenceHub>,
    senders: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl SocketGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection opened: store its outbound channel, register it with
    /// the hub, and deliver the handshake events (snapshot, presence
    /// broadcast). Anonymous connections get a channel but no events.
    pub async fn attach(
        &self,
        conn_id: ConnectionId,
        user_id: Option<&str>,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.senders.write().await.insert(conn_id.clone(), sender);
        let envelopes = self.hub.write().await.connect(conn_id, user_id);
        self.dispatch(envelopes).await;
    }

    /// A connection closed: drop its channel and let the hub decide
    /// whether an offline broadcast goes out.
    pub async fn detach(&self, conn_id: &ConnectionId) {
        self.senders.write().await.remove(conn_id);
        let envelopes = self.hub.write().await.disconnect(conn_id);
        self.dispatch(envelopes).await;
    }

    /// Room membership is only for connections that still hold a channel;
    /// a join arriving after detach would otherwise linger in the hub.
    pub async fn join_chat(&self, conn_id: &ConnectionId, chat_id: &str) {
        if !self.senders.read().await.contains_key(conn_id) {
            debug!(conn_id = %conn_id, "ignoring join for detached connection");
            return;
        }
        self.hub.write().await.join_chat(conn_id, chat_id);
    }

    pub async fn leave_chat(&self, conn_id: &ConnectionId, chat_id: &str) {
        self.hub.write().await.leave_chat(conn_id, chat_id);
    }

    /// Fan a freshly persisted message out to its audience.
    pub async fn route_new_message(&self, message: &Message, chat: &Chat) {
        let envelopes = self.hub.read().await.route_new_message(message, chat);
        self.dispatch(envelopes).await;
    }

    /// Push one batched seen receipt to the given recipients' connections.
    pub async fn notify_seen(
        &self,
        chat_id: &str,
        seen_by: &str,
        message_ids: Vec<String>,
        recipients: &[&str],
    ) {
        let envelopes = self
            .hub
            .read()
            .await
            .notify_seen(chat_id, seen_by, message_ids, recipients);
        self.dispatch(envelopes).await;
    }

    async fn dispatch(&self, envelopes: Vec<Envelope>) {
        if envelopes.is_empty() {
            return;
        }

        let senders = self.senders.read().await;
        for envelope in envelopes {
            match envelope.target {
                Target::Connection(conn_id) => {
                    if let Some(sender) = senders.get(&conn_id) {
                        if sender.send(envelope.event).is_err() {
                            debug!(conn_id = %conn_id, "dropping event for closed connection");
                        }
                    }
                }
                Target::Broadcast => {
                    for (conn_id, sender) in senders.iter() {
                        if sender.send(envelope.event.clone()).is_err() {
                            debug!(conn_id = %conn_id, "dropping broadcast for closed connection");
                        }
                    }
                }
            }
        }
    }
}
