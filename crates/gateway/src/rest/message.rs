//! Message REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Extension, Json, Router,
};
use parley_database::{Message, MessageContent, SeenMessage};
use std::collections::BTreeSet;

use crate::auth::AuthenticatedUser;
use crate::error::GatewayResult;
use crate::state::GatewayState;

/// Create message routes
pub fn create_message_routes() -> Router<GatewayState> {
    Router::new()
        .route(
            "/chats/:chat_id/messages",
            get(list_messages).post(create_message),
        )
        .route("/messages/:message_id", delete(delete_message))
}

/// Send a message into a chat. The message is persisted first and only
/// then routed to live connections; a persistence failure means nothing
/// was delivered anywhere.
pub async fn create_message(
    State(state): State<GatewayState>,
    Path(chat_id): Path<String>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(content): Json<MessageContent>,
) -> GatewayResult<impl IntoResponse> {
    let chat = state.chat_service.get_authorized(&chat_id, &user_id).await?;

    let message = state
        .message_service
        .create_message(&chat, &user_id, content)
        .await?;

    state.sockets.route_new_message(&message, &chat).await;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Fetch the chat's messages in creation order. Fetching marks every
/// message from other senders as seen and pushes one batched seen receipt
/// to the connections of the senders whose messages just transitioned.
pub async fn list_messages(
    State(state): State<GatewayState>,
    Path(chat_id): Path<String>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> GatewayResult<Json<Vec<Message>>> {
    let chat = state.chat_service.get_authorized(&chat_id, &user_id).await?;

    let transitioned = state.message_service.mark_seen(&chat, &user_id).await?;
    let (message_ids, senders) = seen_receipt_targets(&transitioned);
    state
        .sockets
        .notify_seen(&chat.public_id, &user_id, message_ids, &senders)
        .await;

    let messages = state.message_service.list_messages(&chat).await?;
    Ok(Json(messages))
}

/// Ids and distinct senders of a seen transition. The receipt goes to the
/// senders whose messages flipped; a participant with nothing transitioned
/// has nothing to update.
fn seen_receipt_targets(transitioned: &[SeenMessage]) -> (Vec<String>, Vec<&str>) {
    let ids = transitioned.iter().map(|m| m.public_id.clone()).collect();
    let senders: BTreeSet<&str> = transitioned.iter().map(|m| m.sender_id.as_str()).collect();
    (ids, senders.into_iter().collect())
}

/// Delete a single message. Only the sender may do this.
pub async fn delete_message(
    State(state): State<GatewayState>,
    Path(message_id): Path<String>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> GatewayResult<StatusCode> {
    state
        .message_service
        .delete_message(&message_id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seen(public_id: &str, sender_id: &str) -> SeenMessage {
        SeenMessage {
            public_id: public_id.to_string(),
            sender_id: sender_id.to_string(),
        }
    }

    #[test]
    fn receipt_targets_deduplicate_senders() {
        let transitioned = vec![seen("m1", "alice"), seen("m2", "carol"), seen("m3", "alice")];

        let (ids, senders) = seen_receipt_targets(&transitioned);
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(senders, vec!["alice", "carol"]);
    }

    #[test]
    fn empty_transition_yields_no_targets() {
        let (ids, senders) = seen_receipt_targets(&[]);
        assert!(ids.is_empty());
        assert!(senders.is_empty());
    }
}
