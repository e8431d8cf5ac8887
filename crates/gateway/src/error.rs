//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::DatabaseError(_) | GatewayError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<parley_chats::ChatError> for GatewayError {
    fn from(error: parley_chats::ChatError) -> Self {
        match error {
            parley_chats::ChatError::ChatNotFound { id } => {
                GatewayError::NotFound(format!("Chat not found: {id}"))
            }
            parley_chats::ChatError::MessageNotFound { id } => {
                GatewayError::NotFound(format!("Message not found: {id}"))
            }
            parley_chats::ChatError::AccessDenied { reason } => {
                GatewayError::AuthorizationFailed(reason)
            }
            parley_chats::ChatError::Validation { message } => {
                GatewayError::InvalidRequest(message)
            }
            parley_chats::ChatError::Database(error) => {
                GatewayError::DatabaseError(error.to_string())
            }
        }
    }
}
