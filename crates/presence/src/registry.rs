//! Connection registry: user id to the set of live transport connections.

use crate::ConnectionId;
use std::collections::{BTreeSet, HashMap};

/// Emitted when a registry mutation crosses the online/offline boundary.
/// Adding a second device or removing one of several produces no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    Online,
    Offline,
}

/// Maps user ids to their open connections. A user is online iff their set is
/// non-empty. Set arithmetic, not a counter: duplicate unregisters of an
/// already-removed connection are no-ops.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, BTreeSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection for a user. Returns `Online` only on the 0→1
    /// transition so multi-device connects do not re-broadcast presence.
    pub fn register(&mut self, user_id: &str, conn_id: ConnectionId) -> Option<PresenceTransition> {
        let set = self.connections.entry(user_id.to_string()).or_default();
        let was_offline = set.is_empty();
        set.insert(conn_id);
        was_offline.then_some(PresenceTransition::Online)
    }

    /// Remove a connection. Returns `Offline` only when the user's last
    /// connection goes away.
    pub fn unregister(
        &mut self,
        user_id: &str,
        conn_id: &ConnectionId,
    ) -> Option<PresenceTransition> {
        let set = self.connections.get_mut(user_id)?;
        if !set.remove(conn_id) {
            return None;
        }
        if set.is_empty() {
            self.connections.remove(user_id);
            Some(PresenceTransition::Offline)
        } else {
            None
        }
    }

    /// Current connections for a user, empty if none.
    pub fn connections_for(&self, user_id: &str) -> impl Iterator<Item = &ConnectionId> {
        self.connections.get(user_id).into_iter().flatten()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections
            .get(user_id)
            .is_some_and(|set| !set.is_empty())
    }

    /// Snapshot of every currently online user id.
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.connections.keys().cloned().collect();
        users.sort();
        users
    }
}
