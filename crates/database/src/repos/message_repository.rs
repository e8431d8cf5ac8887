//! Repository for message data access operations.

use crate::entities::{CreateMessageRequest, Message, MessageContent, SeenMessage};
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new message and refresh the chat's denormalized
    /// latest-message summary in the same transaction, so the message and
    /// its summary never diverge. Messages are created unseen.
    pub async fn create(&self, request: &CreateMessageRequest) -> DatabaseResult<Message> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let (text, media_url, media_key) = match &request.content {
            MessageContent::Text { text } => (Some(text.as_str()), None, None),
            MessageContent::Image { url, object_key }
            | MessageContent::Video { url, object_key } => {
                (None, Some(url.as_str()), Some(object_key.as_str()))
            }
        };

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO messages (public_id, chat_id, sender_id, message_type, text, media_url, media_key, seen, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&public_id)
        .bind(request.chat_id)
        .bind(&request.sender_id)
        .bind(request.content.type_name())
        .bind(text)
        .bind(media_url)
        .bind(media_key)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE chats SET latest_message_text = ?, latest_message_sender = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(request.content.preview())
        .bind(&request.sender_id)
        .bind(&now)
        .bind(request.chat_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id,
            public_id = %public_id,
            chat_id = request.chat_id,
            sender_id = %request.sender_id,
            "created new message"
        );

        Ok(Message {
            id: message_id,
            public_id,
            chat_id: request.chat_id,
            chat_public_id: request.chat_public_id.clone(),
            sender_id: request.sender_id.clone(),
            content: request.content.clone(),
            seen: false,
            seen_at: None,
            created_at: now,
        })
    }

    /// Messages of a chat in persisted creation order.
    pub async fn list_by_chat(&self, chat_id: i64) -> DatabaseResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT m.id, m.public_id, m.chat_id, c.public_id AS chat_public_id, m.sender_id,
                    m.message_type, m.text, m.media_url, m.media_key, m.seen, m.seen_at, m.created_at
             FROM messages m
             JOIN chats c ON c.id = m.chat_id
             WHERE m.chat_id = ?
             ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_message_row).collect()
    }

    /// Find a message by its public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT m.id, m.public_id, m.chat_id, c.public_id AS chat_public_id, m.sender_id,
                    m.message_type, m.text, m.media_url, m.media_key, m.seen, m.seen_at, m.created_at
             FROM messages m
             JOIN chats c ON c.id = m.chat_id
             WHERE m.public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_message_row).transpose()
    }

    /// Transition every unseen message in the chat not sent by `recipient_id`
    /// to seen, all with one shared timestamp. Returns the transitioned
    /// messages with their senders; an empty result means nothing changed.
    ///
    /// SELECT and UPDATE share one transaction and the UPDATE is keyed to
    /// the selected ids, so a message committed concurrently is never
    /// flipped without appearing in the result.
    pub async fn mark_seen_except_sender(
        &self,
        chat_id: i64,
        recipient_id: &str,
    ) -> DatabaseResult<Vec<SeenMessage>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            "SELECT public_id, sender_id FROM messages
             WHERE chat_id = ? AND sender_id != ? AND seen = 0
             ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .bind(recipient_id)
        .fetch_all(&mut *tx)
        .await?;

        let selected = rows
            .into_iter()
            .map(|row| {
                Ok(SeenMessage {
                    public_id: row.try_get("public_id")?,
                    sender_id: row.try_get("sender_id")?,
                })
            })
            .collect::<DatabaseResult<Vec<_>>>()?;

        if selected.is_empty() {
            return Ok(selected);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let placeholders = vec!["?"; selected.len()].join(", ");
        let update = format!(
            "UPDATE messages SET seen = 1, seen_at = ? WHERE public_id IN ({placeholders})"
        );

        let mut query = sqlx::query(&update).bind(&now);
        for message in &selected {
            query = query.bind(&message.public_id);
        }
        query.execute(&mut *tx).await?;

        tx.commit().await?;

        info!(chat_id, recipient_id = %recipient_id, count = selected.len(), "marked messages seen");
        Ok(selected)
    }

    /// Storage keys of every media object referenced by the chat's messages.
    pub async fn media_keys_for_chat(&self, chat_id: i64) -> DatabaseResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT media_key FROM messages WHERE chat_id = ? AND media_key IS NOT NULL",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_get::<String, _>("media_key").map_err(Into::into))
            .collect()
    }

    /// Delete a single message by id.
    pub async fn delete(&self, message_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        info!(message_id, "deleted message");
        Ok(())
    }
}

fn map_message_row(row: SqliteRow) -> DatabaseResult<Message> {
    let message_type: String = row.try_get("message_type")?;
    let text: Option<String> = row.try_get("text")?;
    let media_url: Option<String> = row.try_get("media_url")?;
    let media_key: Option<String> = row.try_get("media_key")?;

    let content = match message_type.as_str() {
        "image" => MessageContent::Image {
            url: media_url.unwrap_or_default(),
            object_key: media_key.unwrap_or_default(),
        },
        "video" => MessageContent::Video {
            url: media_url.unwrap_or_default(),
            object_key: media_key.unwrap_or_default(),
        },
        "text" => MessageContent::Text {
            text: text.unwrap_or_default(),
        },
        other => {
            return Err(DatabaseError::InvalidData(format!(
                "unknown message_type '{other}'"
            )))
        }
    };

    Ok(Message {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        chat_id: row.try_get("chat_id")?,
        chat_public_id: row.try_get("chat_public_id")?,
        sender_id: row.try_get("sender_id")?,
        content,
        seen: row.try_get("seen")?,
        seen_at: row.try_get("seen_at")?,
        created_at: row.try_get("created_at")?,
    })
}
