//! Message entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub public_id: String,
    pub chat_id: i64,
    pub chat_public_id: String,
    pub sender_id: String,
    #[serde(flatten)]
    pub content: MessageContent,
    pub seen: bool,
    pub seen_at: Option<String>,
    pub created_at: String,
}

/// Tagged message content. The wire format mirrors the REST payloads:
/// `{"messageType": "text", "text": "hi"}` or
/// `{"messageType": "image", "url": ..., "objectKey": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "lowercase")]
pub enum MessageContent {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        url: String,
        object_key: String,
    },
    #[serde(rename_all = "camelCase")]
    Video {
        url: String,
        object_key: String,
    },
}

impl MessageContent {
    pub fn type_name(&self) -> &'static str {
        match self {
            MessageContent::Text { .. } => "text",
            MessageContent::Image { .. } => "image",
            MessageContent::Video { .. } => "video",
        }
    }

    /// Storage key of the referenced media object, if any.
    pub fn object_key(&self) -> Option<&str> {
        match self {
            MessageContent::Text { .. } => None,
            MessageContent::Image { object_key, .. }
            | MessageContent::Video { object_key, .. } => Some(object_key),
        }
    }

    /// Text shown in the chat list's latest-message preview.
    pub fn preview(&self) -> &str {
        match self {
            MessageContent::Text { text } => text,
            MessageContent::Image { .. } => "📷 Image",
            MessageContent::Video { .. } => "📹 Video",
        }
    }
}

/// One row of a seen transition: the message that flipped and who sent it.
/// The sender is needed downstream to target the seen receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenMessage {
    pub public_id: String,
    pub sender_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub chat_id: i64,
    pub chat_public_id: String,
    pub sender_id: String,
    pub content: MessageContent,
}
