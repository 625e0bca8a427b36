use super::ApiError;
use crate::config::PortraitConfig;
use crate::hub::EventHub;
use crate::portrait::{PortraitFeed, PortraitLoader, PortraitProps};
use crate::session::{run_session, PortraitSession};
use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

/// Shared state for the portrait page routes
#[derive(Clone)]
pub struct PortraitAppState {
    pub loader: PortraitLoader,
    pub hub: EventHub,
    pub config: Arc<PortraitConfig>,
}

pub fn create_portrait_router(state: PortraitAppState) -> Router {
    Router::new()
        .route("/portrait/:character_id", get(get_portrait))
        .route("/portrait/:character_id/live", get(portrait_ws))
        .with_state(Arc::new(state))
}

/// GET /portrait/:character_id - Initial page state
async fn get_portrait(
    State(state): State<Arc<PortraitAppState>>,
    Path(character_id): Path<i64>,
) -> Result<Json<PortraitProps>, ApiError> {
    let props = state.loader.load(character_id).await.map_err(|e| {
        error!(error = %e, character_id = character_id, "Failed to load portrait");
        ApiError::from(e)
    })?;
    Ok(Json(props))
}

/// GET /portrait/:character_id/live - WebSocket for one live portrait page
async fn portrait_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<PortraitAppState>>,
    Path(character_id): Path<i64>,
) -> Response {
    info!(character_id = character_id, "Portrait WebSocket upgrade request received");

    // Join the room before loading so nothing published meanwhile is missed
    let mut feed = PortraitFeed::open(&state.hub, character_id, 0);

    let props = match state.loader.load(character_id).await {
        Ok(props) => props,
        Err(e) => {
            error!(error = %e, character_id = character_id, "Failed to load portrait");
            return ApiError::from(e).into_response();
        }
    };

    feed.set_name_info_id(props.player_name.info_id);
    let session = PortraitSession::new(props, &state.config);
    let loader = state.loader.clone();

    ws.on_upgrade(move |socket| run_session(socket, session, feed, loader))
}
