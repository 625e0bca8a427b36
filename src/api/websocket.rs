use crate::hub::EventHub;
use crate::subscription::ConnectionManager;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state for the room socket
#[derive(Clone)]
pub struct WsAppState {
    pub hub: EventHub,
}

/// GET /api/socket - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create room socket router
pub fn create_ws_router(state: WsAppState) -> Router {
    Router::new()
        .route("/api/socket", get(ws_handler))
        .with_state(Arc::new(state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    // Global events only until the client joins rooms
    let manager = ConnectionManager::new(state.hub.subscribe());
    manager.handle(socket).await;
}
