use super::ApiError;
use crate::event::{LiveEvent, Scope};
use crate::hub::EventBus;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared state for live event ingestion
#[derive(Clone)]
pub struct IngestionAppState {
    pub bus: Arc<dyn EventBus>,
}

/// An event to publish, optionally addressed to a single room
#[derive(Deserialize)]
struct PublishRequest {
    #[serde(default)]
    room: Option<String>,
    #[serde(flatten)]
    event: LiveEvent,
}

#[derive(Serialize)]
struct PublishResponse {
    event: &'static str,
    delivered: usize,
}

/// Create router for external producers (roll resolver, sheet editor)
pub fn create_ingestion_router(state: IngestionAppState) -> Router {
    Router::new()
        .route("/api/events", post(publish_event))
        .with_state(Arc::new(state))
}

/// POST /api/events - Publish a live event to a room, or to everyone
async fn publish_event(
    State(state): State<Arc<IngestionAppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let request: PublishRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let scope = match request.room {
        Some(room) if room.is_empty() => {
            return Err(ApiError::BadRequest("room must not be empty".to_string()))
        }
        Some(room) => Scope::Room(room),
        None => Scope::Global,
    };

    let name = request.event.name();
    info!(event = name, scope = ?scope, "Ingesting live event");

    let delivered = state.bus.emit(scope, request.event);

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            event: name,
            delivered,
        }),
    ))
}
