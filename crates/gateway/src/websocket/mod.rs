//! WebSocket endpoint for the gateway

pub mod gateway;
pub mod handler;

pub use gateway::SocketGateway;
pub use handler::websocket_handler;

use serde::Deserialize;

/// Events clients send over the socket. Everything else (presence,
/// disconnect) is implicit in the connection lifecycle.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Start viewing a chat: the connection enters the chat's room.
    #[serde(rename_all = "camelCase")]
    JoinChat { chat_id: String },
    /// Stop viewing a chat.
    #[serde(rename_all = "camelCase")]
    LeaveChat { chat_id: String },
}
