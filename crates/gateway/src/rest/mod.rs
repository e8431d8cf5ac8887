//! REST API endpoints for the gateway

pub mod chat;
pub mod health;
pub mod message;

use axum::Router;

use crate::state::GatewayState;

/// Create all authenticated REST API routes
pub fn create_rest_routes() -> Router<GatewayState> {
    Router::new()
        .merge(chat::create_chat_routes())
        .merge(message::create_message_routes())
}
