use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
mod tests;

/// Config key whose changes drive the portrait's environment mode.
pub const ENVIRONMENT_KEY: &str = "environment";

/// Prefix of the per-character room a portrait page joins.
pub const PORTRAIT_ROOM_PREFIX: &str = "portrait";

/// Room name for one character's portrait, e.g. `portrait5`.
pub fn portrait_room(player_id: i64) -> String {
    format!("{}{}", PORTRAIT_ROOM_PREFIX, player_id)
}

/// A single die as resolved by the roll resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDice {
    pub num: u32,
    pub roll: u32,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<u32>,
}

/// Outcome of one roll, as shown on the portrait.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiceResult {
    pub roll: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DiceResult {
    pub fn new(roll: i64, description: impl Into<String>) -> Self {
        Self {
            roll,
            description: Some(description.into()),
        }
    }
}

/// Events carried by the live channel.
///
/// Wire form is a JSON object tagged by `event`, e.g.
/// `{"event":"configChange","key":"environment","value":"combat"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LiveEvent {
    #[serde(rename_all = "camelCase")]
    ConfigChange { key: String, value: Value },

    /// `None` in `value` or `max_value` means "leave unchanged".
    #[serde(rename_all = "camelCase")]
    AttributeChange {
        player_id: i64,
        attribute_id: i64,
        #[serde(default)]
        value: Option<i64>,
        #[serde(default)]
        max_value: Option<i64>,
    },

    #[serde(rename_all = "camelCase")]
    InfoChange {
        player_id: i64,
        info_id: i64,
        value: String,
    },

    DiceRoll,

    #[serde(rename_all = "camelCase")]
    DiceResult {
        player_id: i64,
        #[serde(default)]
        dices: Vec<ResolvedDice>,
        #[serde(default)]
        results: Vec<DiceResult>,
    },
}

impl LiveEvent {
    /// Event name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::ConfigChange { .. } => "configChange",
            LiveEvent::AttributeChange { .. } => "attributeChange",
            LiveEvent::InfoChange { .. } => "infoChange",
            LiveEvent::DiceRoll => "diceRoll",
            LiveEvent::DiceResult { .. } => "diceResult",
        }
    }
}

/// Delivery scope of an emitted event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Every connected subscriber, whatever rooms it joined.
    Global,
    /// Only subscribers that joined this room.
    Room(String),
}

impl Scope {
    pub fn room(name: impl Into<String>) -> Self {
        Scope::Room(name.into())
    }
}

/// An event together with where it is addressed.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub scope: Scope,
    pub event: LiveEvent,
}
