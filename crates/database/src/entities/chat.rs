//! Chat entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: i64,
    pub public_id: String,
    pub is_group: bool,
    /// Group chats carry a display name; direct chats do not.
    pub group_name: Option<String>,
    /// Designated admin for group chats.
    pub admin_id: Option<String>,
    /// User ids of every participant, sender included.
    pub participants: Vec<String>,
    pub latest_message: Option<LatestMessage>,
    pub created_at: String,
    pub updated_at: String,
}

/// Denormalized preview of the most recent message in a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestMessage {
    pub text: String,
    pub sender: String,
}

impl Chat {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|id| id == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_id.as_deref() == Some(user_id)
    }

    /// The single counterpart in a direct chat.
    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        if self.is_group {
            return None;
        }
        self.participants
            .iter()
            .map(String::as_str)
            .find(|id| *id != user_id)
    }

    /// Every participant except the given sender.
    pub fn recipients_of(&self, sender_id: &str) -> Vec<&str> {
        self.participants
            .iter()
            .map(String::as_str)
            .filter(|id| *id != sender_id)
            .collect()
    }
}
