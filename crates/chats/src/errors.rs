//! Error types for the chat business layer.

use parley_database::DatabaseError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("chat not found: {id}")]
    ChatNotFound { id: String },

    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("validation error: {message}")]
    Validation { message: String },
}

impl ChatError {
    pub fn chat_not_found(id: impl Into<String>) -> Self {
        Self::ChatNotFound { id: id.into() }
    }

    pub fn message_not_found(id: impl Into<String>) -> Self {
        Self::MessageNotFound { id: id.into() }
    }

    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
