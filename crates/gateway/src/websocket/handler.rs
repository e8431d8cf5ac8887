//! Axum handler for the `/ws` upgrade endpoint.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use parley_presence::ConnectionId;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::GatewayResult;
use crate::state::GatewayState;
use crate::websocket::{ClientEvent, SocketGateway};

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    token: Option<String>,
}

/// Upgrade handler. A valid token binds the connection to its user; no
/// token means an anonymous connection, which can still view chat rooms
/// but never appears in presence. A present-but-invalid token is rejected.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<SocketQuery>,
    State(state): State<GatewayState>,
) -> GatewayResult<Response> {
    let user_id = match query.token.as_deref() {
        Some(token) => Some(state.jwt.verify(token)?),
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.sockets.clone(), user_id)))
}

async fn handle_socket(socket: WebSocket, gateway: Arc<SocketGateway>, user_id: Option<String>) {
    let conn_id = ConnectionId::generate();
    let (tx, mut rx) = mpsc::unbounded_channel();
    gateway.attach(conn_id.clone(), user_id.as_deref(), tx).await;

    let (mut sink, mut stream) = socket.split();

    // Outbound: events for this connection, serialized in channel order.
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound: room join/leave requests; anything malformed is ignored.
    let recv_gateway = gateway.clone();
    let recv_conn = conn_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::JoinChat { chat_id }) => {
                        recv_gateway.join_chat(&recv_conn, &chat_id).await;
                    }
                    Ok(ClientEvent::LeaveChat { chat_id }) => {
                        recv_gateway.leave_chat(&recv_conn, &chat_id).await;
                    }
                    Err(error) => {
                        debug!(conn_id = %recv_conn, %error, "ignoring malformed client event");
                    }
                },
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
    });

    // Whichever side finishes first, stop the other before detaching so a
    // late join request cannot re-register the dropped connection.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    gateway.detach(&conn_id).await;
}
