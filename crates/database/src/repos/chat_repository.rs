//! Repository for chat data access operations.

use crate::entities::{Chat, LatestMessage};
use crate::types::DatabaseResult;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for chat database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a direct chat between two users.
    pub async fn create_direct(&self, user_id: &str, other_user_id: &str) -> DatabaseResult<Chat> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO chats (public_id, is_group, created_at, updated_at) VALUES (?, 0, ?, ?)",
        )
        .bind(&public_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let chat_id = result.last_insert_rowid();

        for participant in [user_id, other_user_id] {
            sqlx::query(
                "INSERT INTO chat_participants (chat_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(chat_id)
            .bind(participant)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(chat_id, public_id = %public_id, "created direct chat");

        Ok(Chat {
            id: chat_id,
            public_id,
            is_group: false,
            group_name: None,
            admin_id: None,
            participants: vec![user_id.to_string(), other_user_id.to_string()],
            latest_message: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Create a group chat with the given admin and full member list.
    pub async fn create_group(
        &self,
        name: &str,
        admin_id: &str,
        members: &[String],
    ) -> DatabaseResult<Chat> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO chats (public_id, is_group, group_name, admin_id, created_at, updated_at)
             VALUES (?, 1, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(name)
        .bind(admin_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let chat_id = result.last_insert_rowid();

        for participant in members {
            sqlx::query(
                "INSERT OR IGNORE INTO chat_participants (chat_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(chat_id)
            .bind(participant)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(chat_id, public_id = %public_id, members = members.len(), "created group chat");

        Ok(Chat {
            id: chat_id,
            public_id,
            is_group: true,
            group_name: Some(name.to_string()),
            admin_id: Some(admin_id.to_string()),
            participants: members.to_vec(),
            latest_message: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Find the existing direct chat between two users, if any.
    pub async fn find_direct_between(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT c.id FROM chats c
             JOIN chat_participants a ON a.chat_id = c.id AND a.user_id = ?
             JOIN chat_participants b ON b.chat_id = c.id AND b.user_id = ?
             WHERE c.is_group = 0
             LIMIT 1",
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let id: i64 = row.try_get("id")?;
                self.find_by_id(id).await
            }
            None => Ok(None),
        }
    }

    /// Find a chat by its public ID, participants included.
    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, public_id, is_group, group_name, admin_id,
                    latest_message_text, latest_message_sender, created_at, updated_at
             FROM chats WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_chat(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, public_id, is_group, group_name, admin_id,
                    latest_message_text, latest_message_sender, created_at, updated_at
             FROM chats WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_chat(row).await?)),
            None => Ok(None),
        }
    }

    /// All chats a user participates in, most recently updated first.
    pub async fn list_for_user(&self, user_id: &str) -> DatabaseResult<Vec<Chat>> {
        let rows = sqlx::query(
            "SELECT c.id, c.public_id, c.is_group, c.group_name, c.admin_id,
                    c.latest_message_text, c.latest_message_sender, c.created_at, c.updated_at
             FROM chats c
             JOIN chat_participants p ON p.chat_id = c.id
             WHERE p.user_id = ?
             ORDER BY c.updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in rows {
            chats.push(self.hydrate_chat(row).await?);
        }
        Ok(chats)
    }

    /// Delete a chat; participants and messages cascade.
    pub async fn delete(&self, chat_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        info!(chat_id, "deleted chat");
        Ok(())
    }

    /// Messages in the chat not sent by the user and not yet seen.
    pub async fn unseen_count(&self, chat_id: i64, user_id: &str) -> DatabaseResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unseen FROM messages
             WHERE chat_id = ? AND sender_id != ? AND seen = 0",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("unseen")?)
    }

    async fn hydrate_chat(&self, row: sqlx::sqlite::SqliteRow) -> DatabaseResult<Chat> {
        let id: i64 = row.try_get("id")?;
        let latest_message_text: Option<String> = row.try_get("latest_message_text")?;
        let latest_message_sender: Option<String> = row.try_get("latest_message_sender")?;

        let latest_message = match (latest_message_text, latest_message_sender) {
            (Some(text), Some(sender)) => Some(LatestMessage { text, sender }),
            _ => None,
        };

        let participant_rows = sqlx::query(
            "SELECT user_id FROM chat_participants WHERE chat_id = ? ORDER BY joined_at ASC, user_id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let participants = participant_rows
            .into_iter()
            .map(|row| row.try_get::<String, _>("user_id"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Chat {
            id,
            public_id: row.try_get("public_id")?,
            is_group: row.try_get("is_group")?,
            group_name: row.try_get("group_name")?,
            admin_id: row.try_get("admin_id")?,
            participants,
            latest_message,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
