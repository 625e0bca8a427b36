use crate::event::{portrait_room, DiceResult, LiveEvent, ENVIRONMENT_KEY};
use crate::hub::{EventHub, Subscription};
use crate::store::config_value_text;
use super::ENVIRONMENT_UNKNOWN;
use tracing::{debug, info};

/// Live events that concern one portrait, already filtered.
#[derive(Clone, Debug, PartialEq)]
pub enum PortraitEvent {
    Environment(String),
    Attribute {
        attribute_id: i64,
        value: Option<i64>,
        max_value: Option<i64>,
    },
    Name(String),
    DiceRoll,
    /// First result of a non-empty dice result event
    DiceResult(DiceResult),
}

/// Narrow a live event to what the portrait of `player_id` reacts to.
///
/// Drops config keys other than the environment, events for other players,
/// info fields other than the name field, and dice results without results.
pub fn filter_event(player_id: i64, name_info_id: i64, event: LiveEvent) -> Option<PortraitEvent> {
    match event {
        LiveEvent::ConfigChange { key, value } => {
            if key != ENVIRONMENT_KEY {
                return None;
            }
            let mode = config_value_text(&value).unwrap_or_else(|| ENVIRONMENT_UNKNOWN.to_string());
            Some(PortraitEvent::Environment(mode))
        }
        LiveEvent::AttributeChange {
            player_id: target,
            attribute_id,
            value,
            max_value,
        } => (target == player_id).then_some(PortraitEvent::Attribute {
            attribute_id,
            value,
            max_value,
        }),
        LiveEvent::InfoChange {
            player_id: target,
            info_id,
            value,
        } => (target == player_id && info_id == name_info_id).then_some(PortraitEvent::Name(value)),
        LiveEvent::DiceRoll => Some(PortraitEvent::DiceRoll),
        LiveEvent::DiceResult {
            player_id: target,
            results,
            ..
        } => {
            if target != player_id {
                return None;
            }
            results.into_iter().next().map(PortraitEvent::DiceResult)
        }
    }
}

/// Subscription scoped to one character's portrait room.
pub struct PortraitFeed {
    subscription: Subscription,
    player_id: i64,
    name_info_id: i64,
}

impl PortraitFeed {
    /// Join `portrait<player_id>` on the hub.
    pub fn open(hub: &EventHub, player_id: i64, name_info_id: i64) -> Self {
        let room = portrait_room(player_id);
        let mut subscription = hub.subscribe();
        subscription.join(room.clone());
        info!(room = %room, "Portrait joined room");

        Self {
            subscription,
            player_id,
            name_info_id,
        }
    }

    pub fn player_id(&self) -> i64 {
        self.player_id
    }

    /// The name field can change on reload; info events follow it.
    pub fn set_name_info_id(&mut self, name_info_id: i64) {
        self.name_info_id = name_info_id;
    }

    /// Next relevant event, or `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<PortraitEvent> {
        loop {
            let envelope = self.subscription.recv().await?;
            let name = envelope.event.name();
            match filter_event(self.player_id, self.name_info_id, envelope.event) {
                Some(event) => return Some(event),
                None => debug!(event = name, player_id = self.player_id, "Event not for this portrait"),
            }
        }
    }
}
