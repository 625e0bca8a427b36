use serde::{Deserialize, Serialize};

/// Identity of an attribute definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub id: i64,
    pub name: String,
}

/// A character's current/maximum reading of one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeReading {
    pub value: i64,
    pub max_value: i64,
    pub attribute: AttributeRef,
}

/// The distinguished attribute shown beside the portrait. Value only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideAttributeReading {
    pub value: i64,
    pub attribute: AttributeRef,
}

impl SideAttributeReading {
    /// Placeholder used when the character has no side attribute row.
    pub fn placeholder() -> Self {
        Self {
            value: 0,
            attribute: AttributeRef {
                id: 0,
                name: String::new(),
            },
        }
    }
}

/// One attribute-status flag of a character (e.g. "unconscious").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeStatusFlag {
    pub status_id: i64,
    pub value: bool,
}

/// The character's display name together with the info field it lives in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerName {
    pub value: String,
    pub info_id: i64,
}

/// Literal shown when a character has no name.
pub const UNKNOWN_NAME: &str = "Desconhecido";

impl PlayerName {
    /// Placeholder used when the character has no name info row.
    pub fn placeholder() -> Self {
        Self {
            value: UNKNOWN_NAME.to_string(),
            info_id: 0,
        }
    }
}
