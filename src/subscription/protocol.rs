use crate::event::{Envelope, LiveEvent, Scope};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    RoomJoin { room: String },
    RoomLeave { room: String },
}

/// Server → Client: a live event, with the room it was addressed to (if any)
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(flatten)]
    pub event: LiveEvent,
}

impl From<Envelope> for EventMessage {
    fn from(envelope: Envelope) -> Self {
        let room = match envelope.scope {
            Scope::Global => None,
            Scope::Room(room) => Some(room),
        };
        Self {
            room,
            event: envelope.event,
        }
    }
}

/// Server → Client: Error message
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            error,
        }
    }
}
