//! Message service: sending, fetching, seen transitions, deletion.

use crate::errors::{ChatError, ChatResult};
use crate::media::MediaStore;
use parley_database::{
    Chat, CreateMessageRequest, Message, MessageContent, MessageRepository, SeenMessage,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Service for managing message operations
pub struct MessageService {
    messages: MessageRepository,
    media: Arc<dyn MediaStore>,
}

impl MessageService {
    pub fn new(pool: SqlitePool, media: Arc<dyn MediaStore>) -> Self {
        Self {
            messages: MessageRepository::new(pool),
            media,
        }
    }

    /// Persist a new message in the chat. The repository refreshes the chat's
    /// denormalized latest-message summary in the same transaction. The caller
    /// must already be authorized as a participant; routing to live
    /// connections happens after this returns, so a persistence failure means
    /// nothing was delivered.
    pub async fn create_message(
        &self,
        chat: &Chat,
        sender_id: &str,
        content: MessageContent,
    ) -> ChatResult<Message> {
        if let MessageContent::Text { text } = &content {
            if text.trim().is_empty() {
                return Err(ChatError::validation("Either text or a file is required"));
            }
        }

        let message = self
            .messages
            .create(&CreateMessageRequest {
                chat_id: chat.id,
                chat_public_id: chat.public_id.clone(),
                sender_id: sender_id.to_string(),
                content,
            })
            .await?;

        Ok(message)
    }

    /// Messages of the chat in creation order.
    pub async fn list_messages(&self, chat: &Chat) -> ChatResult<Vec<Message>> {
        self.messages.list_by_chat(chat.id).await.map_err(Into::into)
    }

    /// The seen-state transition: every unseen message in the chat not sent
    /// by the recipient flips to seen with one shared timestamp. Returns the
    /// transitioned messages with their senders; empty on a repeat call,
    /// which callers use to suppress the notification entirely.
    pub async fn mark_seen(
        &self,
        chat: &Chat,
        recipient_id: &str,
    ) -> ChatResult<Vec<SeenMessage>> {
        self.messages
            .mark_seen_except_sender(chat.id, recipient_id)
            .await
            .map_err(Into::into)
    }

    /// Delete one message. Only the sender may delete their own message;
    /// referenced media is handed to the object-store collaborator.
    pub async fn delete_message(&self, message_public_id: &str, user_id: &str) -> ChatResult<()> {
        let message = self
            .messages
            .find_by_public_id(message_public_id)
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_public_id))?;

        if message.sender_id != user_id {
            return Err(ChatError::access_denied(
                "You are not authorized to delete this message",
            ));
        }

        if let Some(object_key) = message.content.object_key() {
            self.media.delete_object(object_key);
        }

        self.messages.delete(message.id).await?;

        info!(message_id = %message.public_id, user_id = %user_id, "message deleted");
        Ok(())
    }
}
