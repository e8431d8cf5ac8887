//! Chat service for conversation-level operations.

use crate::errors::{ChatError, ChatResult};
use crate::media::MediaStore;
use parley_database::{Chat, ChatRepository, MessageRepository};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// A chat together with the caller's unseen-message count, as shown in the
/// chat list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    pub unseen_count: i64,
}

/// Service for managing chat operations
pub struct ChatService {
    chats: ChatRepository,
    messages: MessageRepository,
    media: Arc<dyn MediaStore>,
}

impl ChatService {
    pub fn new(pool: SqlitePool, media: Arc<dyn MediaStore>) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            media,
        }
    }

    /// Create a direct chat with another user, or return the existing one
    /// for the pair. The boolean is true when a new chat was created.
    pub async fn create_direct_chat(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> ChatResult<(Chat, bool)> {
        if other_user_id.is_empty() {
            return Err(ChatError::validation("Other user id is required"));
        }
        if other_user_id == user_id {
            return Err(ChatError::validation("Cannot create a chat with yourself"));
        }

        if let Some(existing) = self.chats.find_direct_between(user_id, other_user_id).await? {
            return Ok((existing, false));
        }

        let chat = self.chats.create_direct(user_id, other_user_id).await?;
        Ok((chat, true))
    }

    /// Create a group chat. The caller becomes the admin; at least two other
    /// members are required, so every group has three or more participants.
    pub async fn create_group_chat(
        &self,
        user_id: &str,
        name: &str,
        members: &[String],
    ) -> ChatResult<Chat> {
        if name.trim().is_empty() || members.len() < 2 {
            return Err(ChatError::validation(
                "Group name and at least 2 members are required",
            ));
        }

        // Admin first, invited members after, duplicates collapsed.
        let mut participants = vec![user_id.to_string()];
        let mut unique: BTreeSet<&str> = BTreeSet::new();
        unique.insert(user_id);
        for member in members {
            if unique.insert(member.as_str()) {
                participants.push(member.clone());
            }
        }

        if participants.len() < 3 {
            return Err(ChatError::validation(
                "Group name and at least 2 members are required",
            ));
        }

        self.chats
            .create_group(name, user_id, &participants)
            .await
            .map_err(Into::into)
    }

    /// All chats the user participates in, most recently updated first,
    /// each with the unseen-message count from the user's point of view.
    pub async fn list_chats(&self, user_id: &str) -> ChatResult<Vec<ChatSummary>> {
        let chats = self.chats.list_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let unseen_count = self.chats.unseen_count(chat.id, user_id).await?;
            summaries.push(ChatSummary { chat, unseen_count });
        }
        Ok(summaries)
    }

    /// Fetch a chat and verify the caller is a participant. Every
    /// conversation-scoped operation runs through this before touching the
    /// router or seen-state logic.
    pub async fn get_authorized(&self, chat_public_id: &str, user_id: &str) -> ChatResult<Chat> {
        let chat = self
            .chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_public_id))?;

        if !chat.is_participant(user_id) {
            return Err(ChatError::access_denied(
                "You are not a participant of this chat",
            ));
        }

        Ok(chat)
    }

    /// Delete a chat with all its messages. Allowed for any participant, or
    /// for the group admin. Referenced media objects are handed to the
    /// object-store collaborator for cleanup.
    pub async fn delete_chat(&self, chat_public_id: &str, user_id: &str) -> ChatResult<()> {
        let chat = self
            .chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or_else(|| ChatError::chat_not_found(chat_public_id))?;

        if !chat.is_participant(user_id) && !chat.is_admin(user_id) {
            return Err(ChatError::access_denied(
                "You are not authorized to delete this chat",
            ));
        }

        for object_key in self.messages.media_keys_for_chat(chat.id).await? {
            self.media.delete_object(&object_key);
        }

        self.chats.delete(chat.id).await?;

        info!(chat_id = %chat.public_id, user_id = %user_id, "chat deleted");
        Ok(())
    }
}
