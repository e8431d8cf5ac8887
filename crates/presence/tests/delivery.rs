//! Fan-out behaviour of the presence hub: presence broadcasts, room
//! delivery, the per-recipient fallback path, and seen receipts.

use parley_database::{Chat, Message, MessageContent};
use parley_presence::{ConnectionId, Envelope, PresenceHub, ServerEvent, Target};

fn conn(id: &str) -> ConnectionId {
    ConnectionId::from(id)
}

fn direct_chat(a: &str, b: &str) -> Chat {
    Chat {
        id: 1,
        public_id: "chat-x".to_string(),
        is_group: false,
        group_name: None,
        admin_id: None,
        participants: vec![a.to_string(), b.to_string()],
        latest_message: None,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn group_chat(admin: &str, members: &[&str]) -> Chat {
    Chat {
        id: 2,
        public_id: "chat-g".to_string(),
        is_group: true,
        group_name: Some("trio".to_string()),
        admin_id: Some(admin.to_string()),
        participants: members.iter().map(|m| m.to_string()).collect(),
        latest_message: None,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn text_message(chat: &Chat, sender: &str, text: &str) -> Message {
    Message {
        id: 1,
        public_id: "m1".to_string(),
        chat_id: chat.id,
        chat_public_id: chat.public_id.clone(),
        sender_id: sender.to_string(),
        content: MessageContent::Text {
            text: text.to_string(),
        },
        seen: false,
        seen_at: None,
        created_at: "2024-01-01T00:00:01Z".to_string(),
    }
}

fn connection_targets(envelopes: &[Envelope]) -> Vec<&ConnectionId> {
    envelopes
        .iter()
        .filter_map(|e| match &e.target {
            Target::Connection(id) => Some(id),
            Target::Broadcast => None,
        })
        .collect()
}

#[test]
fn handshake_pushes_snapshot_and_broadcasts_first_connection() {
    let mut hub = PresenceHub::new();

    let envelopes = hub.connect(conn("c1"), Some("alice"));
    assert_eq!(envelopes.len(), 2);
    assert_eq!(
        envelopes[0],
        Envelope::broadcast(ServerEvent::UserStatus {
            user_id: "alice".to_string(),
            is_online: true,
        })
    );
    assert_eq!(
        envelopes[1],
        Envelope::to_connection(
            conn("c1"),
            ServerEvent::OnlineUsers {
                users: vec!["alice".to_string()],
            }
        )
    );

    // Second device: snapshot only, no presence re-broadcast.
    let envelopes = hub.connect(conn("c2"), Some("alice"));
    assert_eq!(envelopes.len(), 1);
    assert!(matches!(
        envelopes[0].event,
        ServerEvent::OnlineUsers { .. }
    ));
}

#[test]
fn anonymous_connection_is_tolerated() {
    let mut hub = PresenceHub::new();

    assert!(hub.connect(conn("c1"), None).is_empty());
    assert!(!hub.is_online("anyone"));
    assert!(hub.disconnect(&conn("c1")).is_empty());
}

#[test]
fn offline_broadcast_fires_only_on_last_disconnect() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("c1"), Some("alice"));
    hub.connect(conn("c2"), Some("alice"));

    assert!(hub.disconnect(&conn("c1")).is_empty());
    assert!(hub.is_online("alice"));

    let envelopes = hub.disconnect(&conn("c2"));
    assert_eq!(
        envelopes,
        vec![Envelope::broadcast(ServerEvent::UserStatus {
            user_id: "alice".to_string(),
            is_online: false,
        })]
    );
    assert!(!hub.is_online("alice"));
}

#[test]
fn direct_message_reaches_recipient_but_not_sender() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("c1"), Some("alice"));
    hub.connect(conn("c2"), Some("bob"));

    let chat = direct_chat("alice", "bob");
    // Both are viewing the chat.
    hub.join_chat(&conn("c1"), &chat.public_id);
    hub.join_chat(&conn("c2"), &chat.public_id);

    let message = text_message(&chat, "alice", "hi");
    let envelopes = hub.route_new_message(&message, &chat);

    // Bob's connection sits on both the room and the fallback path but
    // receives exactly one copy; Alice's connection receives nothing.
    assert_eq!(connection_targets(&envelopes), vec![&conn("c2")]);
    match &envelopes[0].event {
        ServerEvent::NewMessage { message } => {
            assert_eq!(message.sender_id, "alice");
            assert_eq!(
                message.content,
                MessageContent::Text {
                    text: "hi".to_string()
                }
            );
        }
        other => panic!("expected newMessage, got {other:?}"),
    }
}

#[test]
fn fallback_path_reaches_participants_outside_the_room() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("c1"), Some("alice"));
    hub.connect(conn("c2"), Some("bob"));

    let chat = direct_chat("alice", "bob");
    // Bob is connected but looking at a different chat: no room membership.
    let message = text_message(&chat, "alice", "hi");
    let envelopes = hub.route_new_message(&message, &chat);

    assert_eq!(connection_targets(&envelopes), vec![&conn("c2")]);
}

#[test]
fn offline_recipient_is_skipped_silently() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("c1"), Some("alice"));

    let chat = direct_chat("alice", "bob");
    let message = text_message(&chat, "alice", "hi");

    assert!(hub.route_new_message(&message, &chat).is_empty());
}

#[test]
fn group_fanout_covers_every_member_device_except_sender() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("a1"), Some("alice"));
    hub.connect(conn("b1"), Some("bob"));
    hub.connect(conn("b2"), Some("bob"));
    hub.connect(conn("d1"), Some("dave"));

    let chat = group_chat("alice", &["alice", "bob", "carol"]);
    // Bob's first device is viewing the chat; dave is connected but not a
    // member and not in the room, carol is a member but offline.
    hub.join_chat(&conn("b1"), &chat.public_id);

    let message = text_message(&chat, "alice", "hello group");
    let envelopes = hub.route_new_message(&message, &chat);

    let targets = connection_targets(&envelopes);
    assert_eq!(targets, vec![&conn("b1"), &conn("b2")]);
}

#[test]
fn room_delivery_includes_anonymous_viewers() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("c1"), Some("alice"));
    hub.connect(conn("anon"), None);

    let chat = direct_chat("alice", "bob");
    hub.join_chat(&conn("anon"), &chat.public_id);

    let message = text_message(&chat, "alice", "hi");
    let envelopes = hub.route_new_message(&message, &chat);

    assert_eq!(connection_targets(&envelopes), vec![&conn("anon")]);
}

#[test]
fn leave_chat_stops_room_delivery() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("anon"), None);

    let chat = direct_chat("alice", "bob");
    hub.join_chat(&conn("anon"), &chat.public_id);
    hub.leave_chat(&conn("anon"), &chat.public_id);

    let message = text_message(&chat, "alice", "hi");
    assert!(hub.route_new_message(&message, &chat).is_empty());
}

#[test]
fn seen_receipt_is_one_batched_event_per_connection() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("a1"), Some("alice"));
    hub.connect(conn("a2"), Some("alice"));
    hub.connect(conn("b1"), Some("bob"));

    let envelopes = hub.notify_seen(
        "chat-x",
        "bob",
        vec!["m1".to_string(), "m2".to_string()],
        &["alice"],
    );

    assert_eq!(connection_targets(&envelopes), vec![&conn("a1"), &conn("a2")]);
    for envelope in &envelopes {
        match &envelope.event {
            ServerEvent::MessagesSeen {
                chat_id,
                seen_by,
                message_ids,
            } => {
                assert_eq!(chat_id, "chat-x");
                assert_eq!(seen_by, "bob");
                assert_eq!(message_ids.len(), 2);
            }
            other => panic!("expected messagesSeen, got {other:?}"),
        }
    }
}

#[test]
fn empty_seen_set_emits_nothing() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("a1"), Some("alice"));

    assert!(hub.notify_seen("chat-x", "bob", vec![], &["alice"]).is_empty());
}

#[test]
fn disconnect_drops_room_membership_implicitly() {
    let mut hub = PresenceHub::new();
    hub.connect(conn("b1"), Some("bob"));
    hub.connect(conn("b2"), Some("bob"));

    let chat = direct_chat("alice", "bob");
    hub.join_chat(&conn("b1"), &chat.public_id);
    hub.disconnect(&conn("b1"));

    // Only the surviving device receives the fallback delivery.
    let message = text_message(&chat, "alice", "hi");
    let envelopes = hub.route_new_message(&message, &chat);
    assert_eq!(connection_targets(&envelopes), vec![&conn("b2")]);
}
