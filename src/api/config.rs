use super::ApiError;
use crate::event::{LiveEvent, Scope};
use crate::hub::EventBus;
use crate::store::{config_value_text, Database};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Message returned when the key or value is missing.
pub const KEY_UNDEFINED: &str = "Key is undefined.";

/// State for the config update endpoint
#[derive(Clone)]
pub struct ConfigAppState {
    pub db: Arc<Database>,
    pub bus: Arc<dyn EventBus>,
}

/// Request body. An explicit `null` value is present; only an absent one is rejected.
#[derive(Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    key: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub fn create_config_router(state: ConfigAppState) -> Router {
    Router::new()
        .route("/api/config", post(update_config))
        .with_state(Arc::new(state))
}

/// POST /api/config - Store a config value and broadcast the change
async fn update_config(
    State(state): State<Arc<ConfigAppState>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let (key, value) = parse_update(&body)?;

    let text = config_value_text(&value);
    let db = Arc::clone(&state.db);
    let stored_key = key.clone();
    tokio::task::spawn_blocking(move || db.upsert_config(&stored_key, text.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            error!(error = %e, key = %key, "Failed to store config");
            ApiError::from(e)
        })?;

    info!(key = %key, value = %value, "Config updated");

    // Broadcast to every subscriber, not just one room; delivery is not awaited
    state.bus.emit(Scope::Global, LiveEvent::ConfigChange { key, value });

    Ok(StatusCode::OK)
}

/// Validate the request body into a (key, value) pair.
fn parse_update(body: &[u8]) -> Result<(String, Value), ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest(KEY_UNDEFINED.to_string()));
    }

    let update: ConfigUpdate =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let key = match update.key {
        Some(Value::String(key)) if !key.is_empty() => key,
        _ => return Err(ApiError::BadRequest(KEY_UNDEFINED.to_string())),
    };
    let Some(value) = update.value else {
        return Err(ApiError::BadRequest(KEY_UNDEFINED.to_string()));
    };
    if value.is_array() || value.is_object() {
        return Err(ApiError::BadRequest("Value must be a scalar.".to_string()));
    }

    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> Result<(String, Value), ApiError> {
        parse_update(&serde_json::to_vec(&body).unwrap())
    }

    fn rejected(result: Result<(String, Value), ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_falsy_values_are_accepted() {
        for value in [json!(0), json!(false), json!(""), json!(null)] {
            let (key, parsed) = parse(json!({ "key": "environment", "value": value })).unwrap();
            assert_eq!(key, "environment");
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_missing_value_is_rejected() {
        assert_eq!(rejected(parse(json!({ "key": "environment" }))), KEY_UNDEFINED);
    }

    #[test]
    fn test_missing_or_empty_key_is_rejected() {
        assert_eq!(rejected(parse(json!({ "value": "combat" }))), KEY_UNDEFINED);
        assert_eq!(rejected(parse(json!({ "key": "", "value": "combat" }))), KEY_UNDEFINED);
        assert_eq!(rejected(parse(json!({ "key": null, "value": "combat" }))), KEY_UNDEFINED);
        assert_eq!(rejected(parse_update(b"")), KEY_UNDEFINED);
    }

    #[test]
    fn test_non_scalar_value_is_rejected() {
        let msg = rejected(parse(json!({ "key": "environment", "value": ["combat"] })));
        assert_eq!(msg, "Value must be a scalar.");
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(parse_update(b"{not json"), Err(ApiError::BadRequest(_))));
    }
}
