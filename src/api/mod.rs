// HTTP and WebSocket APIs

pub mod config;
mod error;
pub mod ingestion;
pub mod portrait;
pub mod websocket;

pub use config::{create_config_router, ConfigAppState, KEY_UNDEFINED};
pub use error::ApiError;
pub use ingestion::{create_ingestion_router, IngestionAppState};
pub use portrait::{create_portrait_router, PortraitAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};
