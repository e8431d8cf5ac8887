//! Shared application state for the gateway

use std::sync::Arc;

use parley_chats::{ChatService, LoggingMediaStore, MediaStore, MessageService};
use parley_config::AuthConfig;
use sqlx::SqlitePool;

use crate::auth::JwtVerifier;
use crate::websocket::SocketGateway;

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Chat service
    pub chat_service: Arc<ChatService>,
    /// Message service
    pub message_service: Arc<MessageService>,
    /// Bearer-token verifier
    pub jwt: Arc<JwtVerifier>,
    /// Live socket connections and the presence hub behind them
    pub sockets: Arc<SocketGateway>,
}

impl GatewayState {
    /// Create a new gateway state with all services initialized
    pub fn new(pool: SqlitePool, auth: &AuthConfig) -> Self {
        let media: Arc<dyn MediaStore> = Arc::new(LoggingMediaStore);

        Self {
            chat_service: Arc::new(ChatService::new(pool.clone(), media.clone())),
            message_service: Arc::new(MessageService::new(pool.clone(), media)),
            jwt: Arc::new(JwtVerifier::new(auth)),
            sockets: Arc::new(SocketGateway::new()),
            pool,
        }
    }
}
