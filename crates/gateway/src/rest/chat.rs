//! Chat REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use parley_chats::ChatSummary;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectChatRequest {
    pub other_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupChatRequest {
    pub name: String,
    pub members: Vec<String>,
}

/// Create chat routes
pub fn create_chat_routes() -> Router<GatewayState> {
    Router::new()
        .route("/chats", get(list_chats).post(create_chat))
        .route("/chats/group", post(create_group_chat))
        .route("/chats/:chat_id", delete(delete_chat))
}

/// Create a direct chat with another user. Returns the existing chat with
/// 200 when one already exists for the pair, 201 otherwise.
pub async fn create_chat(
    State(state): State<GatewayState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateDirectChatRequest>,
) -> GatewayResult<impl IntoResponse> {
    let (chat, created) = state
        .chat_service
        .create_direct_chat(&user_id, &body.other_user_id)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(chat)))
}

/// Create a group chat with the caller as admin.
pub async fn create_group_chat(
    State(state): State<GatewayState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateGroupChatRequest>,
) -> GatewayResult<impl IntoResponse> {
    let chat = state
        .chat_service
        .create_group_chat(&user_id, &body.name, &body.members)
        .await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// List the caller's chats, most recently updated first.
pub async fn list_chats(
    State(state): State<GatewayState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> GatewayResult<Json<Vec<ChatSummary>>> {
    let chats = state.chat_service.list_chats(&user_id).await?;
    Ok(Json(chats))
}

/// Delete a chat with all its messages.
pub async fn delete_chat(
    State(state): State<GatewayState>,
    Path(chat_id): Path<String>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> GatewayResult<StatusCode> {
    state.chat_service.delete_chat(&chat_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
