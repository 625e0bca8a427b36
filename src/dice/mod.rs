//! Dice presentation sequencer.
//!
//! Dice results can arrive faster than they can be shown, and the "roll
//! started" announcement may race with, precede or never accompany them. The
//! sequencer keeps a single job slot and a FIFO queue so that every result is
//! shown exactly once, in arrival order, each one preceded by the roll
//! animation, and never two at a time.
//!
//! The machine is pure: it never sleeps. Inputs return [`Command`]s, and
//! delays come back in as [`Timer`]s through [`DiceSequencer::fire`]. A timer
//! carries the number of the job that scheduled it; timers for a job that is
//! no longer in the slot (or in a different stage) are ignored, which makes
//! every pending delay cancellable by simply dropping it.

mod timers;

#[cfg(test)]
mod tests;

pub use timers::TimerQueue;

use crate::config::DiceTimings;
use crate::event::DiceResult;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Externally visible state of the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    /// Roll animation playing, no result shown yet
    Animating,
    ResultShown,
    DescriptionShown,
    /// Fade-out in progress
    Draining,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Animation had time to start; reveal the result
    Settle,
    RevealDescription,
    BeginDrain,
    FinishDrain,
}

/// A delayed input, tagged with the job that scheduled it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub kind: TimerKind,
    pub job: u64,
}

/// Side effects requested by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rewind the roll animation to its start and play it
    RestartAnimation,
    /// Feed `Timer` back through [`DiceSequencer::fire`] after the delay
    Schedule(Timer, Duration),
}

/// What the dice area of the page currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceDisplay {
    pub animation_visible: bool,
    pub result_visible: bool,
    pub description_visible: bool,
    pub roll: i64,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Settling,
    ResultShown,
    DescriptionShown,
    Draining,
}

#[derive(Debug)]
struct Job {
    id: u64,
    result: DiceResult,
    stage: Stage,
}

pub struct DiceSequencer {
    timings: DiceTimings,
    animation_attached: bool,
    job: Option<Job>,
    queue: VecDeque<DiceResult>,
    display: DiceDisplay,
    next_job: u64,
}

impl DiceSequencer {
    pub fn new(timings: DiceTimings) -> Self {
        Self {
            timings,
            animation_attached: true,
            job: None,
            queue: VecDeque::new(),
            display: DiceDisplay::default(),
            next_job: 1,
        }
    }

    /// A sequencer with no animation surface. Roll announcements are no-ops
    /// and results are revealed without waiting for an animation to settle.
    pub fn without_animation(timings: DiceTimings) -> Self {
        Self {
            animation_attached: false,
            ..Self::new(timings)
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.job {
            Some(job) => match job.stage {
                Stage::Settling => Phase::Animating,
                Stage::ResultShown => Phase::ResultShown,
                Stage::DescriptionShown => Phase::DescriptionShown,
                Stage::Draining => Phase::Draining,
            },
            None if self.display.animation_visible => Phase::Animating,
            None => Phase::Idle,
        }
    }

    pub fn display(&self) -> &DiceDisplay {
        &self.display
    }

    /// The result occupying the job slot, if any.
    pub fn in_flight(&self) -> Option<&DiceResult> {
        self.job.as_ref().map(|job| &job.result)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// A roll is about to resolve: start the animation unless it is already playing.
    pub fn roll(&mut self) -> Vec<Command> {
        if self.display.animation_visible || !self.animation_attached {
            return Vec::new();
        }
        self.display.animation_visible = true;
        vec![Command::RestartAnimation]
    }

    /// A result arrived.
    pub fn result(&mut self, result: DiceResult) -> Vec<Command> {
        if self.job.is_some() {
            self.queue.push_back(result);
            debug!(queued = self.queue.len(), "Dice result queued");
            return Vec::new();
        }

        let id = self.take_job_id();
        self.job = Some(Job {
            id,
            result,
            stage: Stage::Settling,
        });

        if self.display.animation_visible || !self.animation_attached {
            self.reveal()
        } else {
            self.settle()
        }
    }

    /// A previously scheduled timer elapsed.
    pub fn fire(&mut self, timer: Timer) -> Vec<Command> {
        let Some(stage) = self
            .job
            .as_ref()
            .filter(|job| job.id == timer.job)
            .map(|job| job.stage)
        else {
            return Vec::new();
        };

        match (timer.kind, stage) {
            (TimerKind::Settle, Stage::Settling) => self.reveal(),
            (TimerKind::RevealDescription, Stage::ResultShown) => {
                self.reveal_description();
                Vec::new()
            }
            (TimerKind::BeginDrain, Stage::ResultShown | Stage::DescriptionShown) => {
                self.begin_drain()
            }
            (TimerKind::FinishDrain, Stage::Draining) => self.finish_drain(),
            _ => Vec::new(),
        }
    }

    fn take_job_id(&mut self) -> u64 {
        let id = self.next_job;
        self.next_job += 1;
        id
    }

    fn schedule(&self, kind: TimerKind, after: Duration) -> Command {
        let job = self.job.as_ref().map(|job| job.id).unwrap_or_default();
        Command::Schedule(Timer { kind, job }, after)
    }

    /// Start (or keep) the animation and wait for it to settle before revealing.
    fn settle(&mut self) -> Vec<Command> {
        if !self.animation_attached {
            return self.reveal();
        }
        let mut commands = self.roll();
        commands.push(self.schedule(TimerKind::Settle, self.timings.settle()));
        commands
    }

    fn reveal(&mut self) -> Vec<Command> {
        let Some(job) = self.job.as_mut() else {
            return Vec::new();
        };
        job.stage = Stage::ResultShown;
        self.display.roll = job.result.roll;
        self.display.result_visible = true;
        debug!(job = job.id, roll = job.result.roll, "Dice result revealed");

        vec![
            self.schedule(TimerKind::RevealDescription, self.timings.description()),
            self.schedule(TimerKind::BeginDrain, self.timings.hold()),
        ]
    }

    fn reveal_description(&mut self) {
        if let Some(job) = self.job.as_mut() {
            job.stage = Stage::DescriptionShown;
            self.display.description = job.result.description.clone().unwrap_or_default();
            self.display.description_visible = true;
        }
    }

    fn begin_drain(&mut self) -> Vec<Command> {
        if let Some(job) = self.job.as_mut() {
            job.stage = Stage::Draining;
        }
        self.display.result_visible = false;
        self.display.description_visible = false;
        self.display.animation_visible = false;
        vec![self.schedule(TimerKind::FinishDrain, self.timings.fade())]
    }

    fn finish_drain(&mut self) -> Vec<Command> {
        self.display.roll = 0;
        self.display.description.clear();
        self.job = None;

        match self.queue.pop_front() {
            Some(next) => {
                // Queued results always replay the roll-start path
                let id = self.take_job_id();
                self.job = Some(Job {
                    id,
                    result: next,
                    stage: Stage::Settling,
                });
                self.settle()
            }
            None => Vec::new(),
        }
    }
}
