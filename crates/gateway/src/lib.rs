//! # Parley Gateway Crate
//!
//! The transport shell of the chat backend: HTTP REST endpoints for
//! chats and messages, plus the WebSocket endpoint that connects clients
//! to the presence hub. Handlers authorize, call into `parley-chats`, and
//! hand fan-out to the socket gateway; all routing decisions live in
//! `parley-presence`.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use auth::{AuthenticatedUser, JwtVerifier};
pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;
pub use websocket::SocketGateway;

use axum::{http::Method, middleware as axum_middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let api = rest::create_rest_routes().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .nest("/api/v1", api)
        .route("/ws", get(websocket::websocket_handler))
        .route("/health", get(rest::health::health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}
