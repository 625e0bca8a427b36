//! Portrait page state: initial load from the store, the reactive view kept
//! up to date by live events, the avatar source and the per-character feed.

mod avatar;
mod feed;
mod view;


pub use avatar::AvatarSource;
pub use feed::{filter_event, PortraitEvent, PortraitFeed};
pub use view::PortraitView;

use crate::config::PortraitSection;
use crate::event::ENVIRONMENT_KEY;
use crate::store::{
    AttributeReading, AttributeStatusFlag, Database, PlayerName, SideAttributeReading,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const ENVIRONMENT_UNKNOWN: &str = "unknown";
pub const ENVIRONMENT_COMBAT: &str = "combat";
pub const ENVIRONMENT_IDLE: &str = "idle";

/// Initial state of a portrait page, as rendered on first load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitProps {
    pub player_id: i64,
    pub environment: String,
    pub attributes: Vec<AttributeReading>,
    pub side_attribute: SideAttributeReading,
    pub attribute_status: Vec<AttributeStatusFlag>,
    pub player_name: PlayerName,
}

impl PortraitProps {
    /// Id of the first status flag that is set; selects the avatar variant.
    pub fn active_status_id(&self) -> Option<i64> {
        active_status_id(&self.attribute_status)
    }
}

pub fn active_status_id(flags: &[AttributeStatusFlag]) -> Option<i64> {
    flags.iter().find(|flag| flag.value).map(|flag| flag.status_id)
}

/// Loads [`PortraitProps`] for one character.
#[derive(Clone)]
pub struct PortraitLoader {
    db: Arc<Database>,
    section: Arc<PortraitSection>,
}

impl PortraitLoader {
    pub fn new(db: Arc<Database>, section: PortraitSection) -> Self {
        Self {
            db,
            section: Arc::new(section),
        }
    }

    pub fn section(&self) -> &PortraitSection {
        &self.section
    }

    /// Runs the five independent store reads concurrently and fills in the
    /// defaults for anything missing.
    pub async fn load(&self, player_id: i64) -> Result<PortraitProps> {
        let attribute_names = self.section.attributes.clone();
        let side_name = self.section.side_attribute.clone();
        let name_info = self.section.name_info.clone();

        let (environment, attributes, side_attribute, attribute_status, player_name) = tokio::try_join!(
            self.query(|db| db.get_config(ENVIRONMENT_KEY)),
            self.query(move |db| db.player_attributes(player_id, &attribute_names)),
            self.query(move |db| db.side_attribute(player_id, &side_name)),
            self.query(move |db| db.attribute_statuses(player_id)),
            self.query(move |db| db.player_info(player_id, &name_info)),
        )?;

        debug!(
            player_id = player_id,
            attributes = attributes.len(),
            statuses = attribute_status.len(),
            "Loaded portrait state"
        );

        Ok(PortraitProps {
            player_id,
            environment: environment
                .filter(|env| !env.is_empty())
                .unwrap_or_else(|| ENVIRONMENT_UNKNOWN.to_string()),
            attributes,
            side_attribute: side_attribute.unwrap_or_else(SideAttributeReading::placeholder),
            attribute_status,
            player_name: player_name.unwrap_or_else(PlayerName::placeholder),
        })
    }

    async fn query<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .context("Store query task failed")?
    }
}
