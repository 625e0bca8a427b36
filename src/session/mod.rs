//! One live portrait page.
//!
//! A session owns the reactive view, the avatar source and the dice
//! sequencer of a single connected page. The websocket driver in
//! [`connection`] feeds it events, client messages and due timers, and pushes
//! a fresh [`PortraitSnapshot`] after every visible change. Dropping the
//! session drops its pending timers.

mod connection;

pub use connection::{run_session, SessionMessage};

use crate::config::PortraitConfig;
use crate::dice::{Command, DiceDisplay, DiceSequencer, Phase, TimerQueue};
use crate::portrait::{AvatarSource, PortraitEvent, PortraitProps, PortraitView};
use crate::store::{AttributeReading, SideAttributeReading};
use serde::Serialize;
use tokio::time::Instant;

/// Everything the page renders, sent to the browser as JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitSnapshot {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub player_id: i64,
    pub environment: String,
    pub show_combat: bool,
    pub show_name: bool,
    pub attributes: Vec<AttributeReading>,
    pub side_attribute: SideAttributeReading,
    pub player_name: String,
    pub avatar_src: String,
    pub dice: DiceDisplay,
    pub dice_phase: Phase,
    /// Bumped every time the roll animation must rewind and play
    pub animation_epoch: u64,
}

pub struct PortraitSession {
    view: PortraitView,
    avatar: AvatarSource,
    dice: DiceSequencer,
    timers: TimerQueue,
    animation_epoch: u64,
}

impl PortraitSession {
    pub fn new(props: PortraitProps, config: &PortraitConfig) -> Self {
        let avatar = AvatarSource::new(
            &config.portrait.avatar_path,
            &config.portrait.fallback_avatar,
            props.active_status_id(),
        );
        Self {
            view: PortraitView::from(props),
            avatar,
            dice: DiceSequencer::new(config.dice),
            timers: TimerQueue::new(),
            animation_epoch: 0,
        }
    }

    pub fn view(&self) -> &PortraitView {
        &self.view
    }

    pub fn dice(&self) -> &DiceSequencer {
        &self.dice
    }

    /// Apply a feed event. Returns whether the snapshot changed.
    pub fn handle(&mut self, event: PortraitEvent, now: Instant) -> bool {
        match event {
            PortraitEvent::DiceRoll => {
                let commands = self.dice.roll();
                self.run(commands, now)
            }
            PortraitEvent::DiceResult(result) => {
                let before = self.dice.display().clone();
                let commands = self.dice.result(result);
                self.run(commands, now) | (self.dice.display() != &before)
            }
            other => self.view.apply(&other),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Fire every timer due at `now`. Returns whether the snapshot changed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for timer in self.timers.pop_due(now) {
            let before = self.dice.display().clone();
            let commands = self.dice.fire(timer);
            changed |= self.run(commands, now) | (self.dice.display() != &before);
        }
        changed
    }

    /// The browser could not load the avatar image.
    pub fn avatar_failed(&mut self) -> bool {
        self.avatar.failed()
    }

    /// Replace the view with freshly loaded props, keeping dice state. The
    /// avatar is only re-requested if the active status changed.
    pub fn reload(&mut self, props: PortraitProps) -> bool {
        let avatar_changed = self.avatar.update_now(props.active_status_id());
        let view = PortraitView::from(props);
        let view_changed = view != self.view;
        self.view = view;
        avatar_changed || view_changed
    }

    pub fn snapshot(&self) -> PortraitSnapshot {
        PortraitSnapshot {
            msg_type: "portrait",
            player_id: self.view.player_id,
            environment: self.view.environment.clone(),
            show_combat: self.view.shows_combat(),
            show_name: self.view.shows_name(),
            attributes: self.view.attributes.clone(),
            side_attribute: self.view.side_attribute.clone(),
            player_name: self.view.display_name().to_string(),
            avatar_src: self.avatar.src().to_string(),
            dice: self.dice.display().clone(),
            dice_phase: self.dice.phase(),
            animation_epoch: self.animation_epoch,
        }
    }

    fn run(&mut self, commands: Vec<Command>, now: Instant) -> bool {
        let mut changed = false;
        for command in commands {
            match command {
                Command::RestartAnimation => {
                    self.animation_epoch += 1;
                    changed = true;
                }
                Command::Schedule(timer, after) => self.timers.schedule(now, timer, after),
            }
        }
        changed
    }
}
