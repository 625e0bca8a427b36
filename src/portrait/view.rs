use super::{PortraitEvent, PortraitProps, ENVIRONMENT_COMBAT, ENVIRONMENT_IDLE};
use crate::store::{AttributeReading, AttributeStatusFlag, PlayerName, SideAttributeReading, UNKNOWN_NAME};

/// Reactive state of a live portrait page.
#[derive(Clone, Debug, PartialEq)]
pub struct PortraitView {
    pub player_id: i64,
    pub environment: String,
    pub attributes: Vec<AttributeReading>,
    pub side_attribute: SideAttributeReading,
    pub attribute_status: Vec<AttributeStatusFlag>,
    pub player_name: PlayerName,
}

impl From<PortraitProps> for PortraitView {
    fn from(props: PortraitProps) -> Self {
        Self {
            player_id: props.player_id,
            environment: props.environment,
            attributes: props.attributes,
            side_attribute: props.side_attribute,
            attribute_status: props.attribute_status,
            player_name: props.player_name,
        }
    }
}

impl PortraitView {
    /// Apply a filtered event. Returns whether anything visible changed.
    ///
    /// Dice events are not part of the view and always return false.
    pub fn apply(&mut self, event: &PortraitEvent) -> bool {
        match event {
            PortraitEvent::Environment(mode) => {
                if &self.environment == mode {
                    return false;
                }
                self.environment = mode.clone();
                true
            }
            PortraitEvent::Attribute {
                attribute_id,
                value,
                max_value,
            } => self.apply_attribute(*attribute_id, *value, *max_value),
            PortraitEvent::Name(name) => {
                if &self.player_name.value == name {
                    return false;
                }
                self.player_name.value = name.clone();
                true
            }
            PortraitEvent::DiceRoll | PortraitEvent::DiceResult(_) => false,
        }
    }

    /// `None` leaves a field as is. Unknown attribute ids are ignored.
    fn apply_attribute(&mut self, attribute_id: i64, value: Option<i64>, max_value: Option<i64>) -> bool {
        let mut changed = false;

        if let Some(reading) = self
            .attributes
            .iter_mut()
            .find(|reading| reading.attribute.id == attribute_id)
        {
            if let Some(value) = value {
                changed |= reading.value != value;
                reading.value = value;
            }
            if let Some(max_value) = max_value {
                changed |= reading.max_value != max_value;
                reading.max_value = max_value;
            }
        }

        if self.side_attribute.attribute.id == attribute_id {
            if let Some(value) = value {
                changed |= self.side_attribute.value != value;
                self.side_attribute.value = value;
            }
        }

        changed
    }

    pub fn shows_combat(&self) -> bool {
        self.environment == ENVIRONMENT_COMBAT
    }

    pub fn shows_name(&self) -> bool {
        self.environment == ENVIRONMENT_IDLE
    }

    /// Name to display; an empty name reads as unknown.
    pub fn display_name(&self) -> &str {
        if self.player_name.value.is_empty() {
            UNKNOWN_NAME
        } else {
            &self.player_name.value
        }
    }
}
