//! Parley Database Crate
//!
//! Connection management, migrations, and repository implementations for the
//! chat backend. User records live in the external user service; this crate
//! only persists chats, participant lists, and messages.

use parley_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{ChatRepository, MessageRepository};

pub use entities::{
    chat::{Chat, LatestMessage},
    message::{CreateMessageRequest, Message, MessageContent, SeenMessage},
};

pub use types::{DatabaseError, DatabaseResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().expect("tempdir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.expect("init database");
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn create_and_fetch_direct_chat() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        assert!(!chat.is_group);
        assert_eq!(chat.participants.len(), 2);

        let found = chats
            .find_by_public_id(&chat.public_id)
            .await
            .unwrap()
            .expect("chat should exist");
        assert_eq!(found.id, chat.id);
        assert!(found.is_participant("alice"));
        assert!(found.is_participant("bob"));
        assert!(!found.is_participant("carol"));

        let existing = chats
            .find_direct_between("bob", "alice")
            .await
            .unwrap()
            .expect("direct chat should be found in either order");
        assert_eq!(existing.id, chat.id);
    }

    #[tokio::test]
    async fn message_round_trip_preserves_content() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        let created = messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "alice".to_string(),
                content: MessageContent::Text {
                    text: "hello".to_string(),
                },
            })
            .await
            .unwrap();

        let listed = messages.list_by_chat(chat.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].public_id, created.public_id);
        assert_eq!(listed[0].sender_id, "alice");
        assert!(!listed[0].seen);
        assert_eq!(
            listed[0].content,
            MessageContent::Text {
                text: "hello".to_string()
            }
        );
    }

    #[tokio::test]
    async fn mark_seen_is_idempotent_and_skips_own_messages() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        for text in ["one", "two"] {
            messages
                .create(&CreateMessageRequest {
                    chat_id: chat.id,
                    chat_public_id: chat.public_id.clone(),
                    sender_id: "alice".to_string(),
                    content: MessageContent::Text {
                        text: text.to_string(),
                    },
                })
                .await
                .unwrap();
        }
        messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "bob".to_string(),
                content: MessageContent::Text {
                    text: "reply".to_string(),
                },
            })
            .await
            .unwrap();

        // Bob sees Alice's two messages, not his own.
        let transitioned = messages
            .mark_seen_except_sender(chat.id, "bob")
            .await
            .unwrap();
        assert_eq!(transitioned.len(), 2);
        assert!(transitioned.iter().all(|m| m.sender_id == "alice"));

        let listed = messages.list_by_chat(chat.id).await.unwrap();
        let seen_at: Vec<_> = listed
            .iter()
            .filter(|m| m.sender_id == "alice")
            .map(|m| m.seen_at.clone().expect("seen_at set"))
            .collect();
        assert_eq!(seen_at.len(), 2);
        // Batch transition shares one timestamp.
        assert_eq!(seen_at[0], seen_at[1]);

        // Second call selects an empty set.
        let again = messages
            .mark_seen_except_sender(chat.id, "bob")
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn mark_seen_flips_exactly_the_returned_messages() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats
            .create_group(
                "trio",
                "alice",
                &["alice".to_string(), "bob".to_string(), "carol".to_string()],
            )
            .await
            .unwrap();
        for (sender, text) in [("alice", "one"), ("carol", "two"), ("bob", "mine")] {
            messages
                .create(&CreateMessageRequest {
                    chat_id: chat.id,
                    chat_public_id: chat.public_id.clone(),
                    sender_id: sender.to_string(),
                    content: MessageContent::Text {
                        text: text.to_string(),
                    },
                })
                .await
                .unwrap();
        }

        let transitioned = messages
            .mark_seen_except_sender(chat.id, "bob")
            .await
            .unwrap();

        // The returned rows and the rows flipped in the database agree
        // one to one, senders included.
        let listed = messages.list_by_chat(chat.id).await.unwrap();
        let flipped: Vec<_> = listed.iter().filter(|m| m.seen).collect();
        assert_eq!(flipped.len(), transitioned.len());
        for seen in &transitioned {
            let row = flipped
                .iter()
                .find(|m| m.public_id == seen.public_id)
                .expect("returned id was flipped");
            assert_eq!(row.sender_id, seen.sender_id);
        }

        // A message persisted after the transition stays unseen.
        let late = messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "alice".to_string(),
                content: MessageContent::Text {
                    text: "late".to_string(),
                },
            })
            .await
            .unwrap();
        let listed = messages.list_by_chat(chat.id).await.unwrap();
        let late_row = listed.iter().find(|m| m.public_id == late.public_id).unwrap();
        assert!(!late_row.seen);
    }

    #[tokio::test]
    async fn message_create_refreshes_latest_summary() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "alice".to_string(),
                content: MessageContent::Text {
                    text: "ping".to_string(),
                },
            })
            .await
            .unwrap();

        let found = chats
            .find_by_public_id(&chat.public_id)
            .await
            .unwrap()
            .expect("chat exists");
        let latest = found.latest_message.expect("summary set");
        assert_eq!(latest.text, "ping");
        assert_eq!(latest.sender, "alice");
        assert!(found.updated_at >= chat.updated_at);
    }

    #[tokio::test]
    async fn unseen_count_tracks_recipient_view() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "alice".to_string(),
                content: MessageContent::Text {
                    text: "ping".to_string(),
                },
            })
            .await
            .unwrap();

        assert_eq!(chats.unseen_count(chat.id, "bob").await.unwrap(), 1);
        assert_eq!(chats.unseen_count(chat.id, "alice").await.unwrap(), 0);

        messages
            .mark_seen_except_sender(chat.id, "bob")
            .await
            .unwrap();
        assert_eq!(chats.unseen_count(chat.id, "bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn chat_delete_cascades_messages() {
        let (pool, _guard) = create_test_database().await;
        let chats = ChatRepository::new(pool.clone());
        let messages = MessageRepository::new(pool);

        let chat = chats.create_direct("alice", "bob").await.unwrap();
        messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: "alice".to_string(),
                content: MessageContent::Image {
                    url: "https://cdn.example/pic.png".to_string(),
                    object_key: "pic.png".to_string(),
                },
            })
            .await
            .unwrap();

        let keys = messages.media_keys_for_chat(chat.id).await.unwrap();
        assert_eq!(keys, vec!["pic.png".to_string()]);

        chats.delete(chat.id).await.unwrap();
        assert!(messages.list_by_chat(chat.id).await.unwrap().is_empty());
        assert!(chats
            .find_by_public_id(&chat.public_id)
            .await
            .unwrap()
            .is_none());
    }
}
