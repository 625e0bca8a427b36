use super::*;
use std::time::Duration;
use tokio::time::Instant;

/// Drives a sequencer against a virtual clock measured in milliseconds.
struct Harness {
    seq: DiceSequencer,
    timers: TimerQueue,
    start: Instant,
    now: Instant,
    restarts: usize,
    /// (ms, roll) every time a result became visible
    reveals: Vec<(u64, i64)>,
    /// (ms, description) every time a description became visible
    descriptions: Vec<(u64, String)>,
}

impl Harness {
    fn new() -> Self {
        Self::with(DiceSequencer::new(DiceTimings::default()))
    }

    fn with(seq: DiceSequencer) -> Self {
        let start = Instant::now();
        Self {
            seq,
            timers: TimerQueue::new(),
            start,
            now: start,
            restarts: 0,
            reveals: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    fn ms(&self) -> u64 {
        self.now.duration_since(self.start).as_millis() as u64
    }

    fn step(&mut self, commands: Vec<Command>, before: DiceDisplay) {
        for command in commands {
            match command {
                Command::RestartAnimation => self.restarts += 1,
                Command::Schedule(timer, after) => self.timers.schedule(self.now, timer, after),
            }
        }

        let after = self.seq.display().clone();
        if after.result_visible && !before.result_visible {
            self.reveals.push((self.ms(), after.roll));
        }
        if after.description_visible && !before.description_visible {
            self.descriptions.push((self.ms(), after.description.clone()));
        }
        // Never a result and a fading state at once
        if after.result_visible {
            assert!(after.animation_visible || !self.seq.animation_attached);
        }
    }

    fn roll(&mut self) {
        let before = self.seq.display().clone();
        let commands = self.seq.roll();
        self.step(commands, before);
    }

    fn result(&mut self, roll: i64, description: &str) {
        let before = self.seq.display().clone();
        let commands = self.seq.result(DiceResult::new(roll, description));
        self.step(commands, before);
    }

    fn advance_to(&mut self, ms: u64) {
        let target = self.start + Duration::from_millis(ms);
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = deadline;
            for timer in self.timers.pop_due(deadline) {
                let before = self.seq.display().clone();
                let commands = self.seq.fire(timer);
                self.step(commands, before);
            }
        }
        self.now = target;
    }

    fn run_until_idle(&mut self) {
        self.advance_to(60_000);
        assert!(self.timers.is_empty());
    }
}

#[test]
fn test_roll_starts_animation_once() {
    let mut h = Harness::new();
    h.roll();
    assert_eq!(h.seq.phase(), Phase::Animating);
    assert!(h.seq.display().animation_visible);

    // Already playing: no restart
    h.roll();
    assert_eq!(h.restarts, 1);
}

#[test]
fn test_result_after_roll_is_revealed_immediately() {
    let mut h = Harness::new();
    h.roll();
    h.result(12, "Hit");

    assert_eq!(h.seq.phase(), Phase::ResultShown);
    assert_eq!(h.seq.display().roll, 12);
    assert!(!h.seq.display().description_visible);

    h.advance_to(750);
    assert_eq!(h.seq.phase(), Phase::DescriptionShown);
    assert_eq!(h.seq.display().description, "Hit");

    h.advance_to(3000);
    assert_eq!(h.seq.phase(), Phase::Draining);
    let display = h.seq.display();
    assert!(!display.result_visible && !display.description_visible && !display.animation_visible);
    // Values linger while fading out
    assert_eq!(display.roll, 12);

    h.advance_to(3600);
    assert_eq!(h.seq.phase(), Phase::Idle);
    assert_eq!(h.seq.display(), &DiceDisplay::default());
    assert!(h.seq.in_flight().is_none());
}

#[test]
fn test_result_without_roll_animates_first() {
    let mut h = Harness::new();
    h.result(7, "");

    assert_eq!(h.restarts, 1);
    assert_eq!(h.seq.phase(), Phase::Animating);
    assert!(h.seq.in_flight().is_some());
    assert!(!h.seq.display().result_visible);

    h.advance_to(999);
    assert!(h.reveals.is_empty());

    h.advance_to(1000);
    assert_eq!(h.reveals, vec![(1000, 7)]);
}

#[test]
fn test_roll_then_two_results_never_overlap() {
    let mut h = Harness::new();
    h.roll();
    h.result(18, "Crit");
    h.result(3, "");
    assert_eq!(h.seq.queued(), 1);

    h.run_until_idle();

    // 18 at once; 3 after reveal-hold-drain (3600) plus a fresh settle (1000)
    assert_eq!(h.reveals, vec![(0, 18), (4600, 3)]);
    assert_eq!(h.descriptions, vec![(750, "Crit".to_string()), (5350, String::new())]);
    assert_eq!(h.restarts, 2);
    assert_eq!(h.seq.phase(), Phase::Idle);
}

#[test]
fn test_back_to_back_results_without_roll_play_in_order() {
    let mut h = Harness::new();
    h.result(5, "first");
    h.result(9, "second");

    h.run_until_idle();

    assert_eq!(h.reveals, vec![(1000, 5), (5600, 9)]);
    assert_eq!(h.restarts, 2);
}

#[test]
fn test_result_during_settle_waits_its_turn() {
    let mut h = Harness::new();
    h.result(1, "a");
    h.advance_to(500);
    // Animation is already visible, but the slot is taken by the settling result
    h.result(2, "b");
    assert_eq!(h.seq.queued(), 1);

    h.run_until_idle();
    assert_eq!(h.reveals, vec![(1000, 1), (5600, 2)]);
}

#[test]
fn test_results_during_fade_are_queued() {
    let mut h = Harness::new();
    h.roll();
    h.result(4, "");
    h.advance_to(3200);
    assert_eq!(h.seq.phase(), Phase::Draining);

    h.result(6, "");
    assert_eq!(h.seq.queued(), 1);

    h.run_until_idle();
    assert_eq!(h.reveals, vec![(0, 4), (4600, 6)]);
}

#[test]
fn test_roll_during_fade_still_settles_next_result() {
    let mut h = Harness::new();
    h.roll();
    h.result(10, "");
    h.result(11, "");
    h.advance_to(3300);

    // New announcement while fading: animation restarts immediately
    h.roll();
    assert_eq!(h.restarts, 2);
    assert!(h.seq.display().animation_visible);

    h.run_until_idle();
    // Drain finishes at 3600, queued result still waits the settle delay
    assert_eq!(h.reveals, vec![(0, 10), (4600, 11)]);
    assert_eq!(h.restarts, 2);
}

#[test]
fn test_stale_timer_is_ignored() {
    let mut h = Harness::new();
    h.roll();
    h.result(8, "");

    let stale = Timer {
        kind: TimerKind::BeginDrain,
        job: 99,
    };
    assert!(h.seq.fire(stale).is_empty());
    assert_eq!(h.seq.phase(), Phase::ResultShown);

    // Right job, wrong stage
    let early = Timer {
        kind: TimerKind::FinishDrain,
        job: 1,
    };
    assert!(h.seq.fire(early).is_empty());
    assert_eq!(h.seq.phase(), Phase::ResultShown);
}

#[test]
fn test_missing_description_shows_empty_text() {
    let mut h = Harness::new();
    h.roll();
    let before = h.seq.display().clone();
    let commands = h.seq.result(DiceResult {
        roll: 2,
        description: None,
    });
    h.step(commands, before);

    h.advance_to(750);
    assert_eq!(h.descriptions, vec![(750, String::new())]);
}

#[test]
fn test_without_animation_reveals_directly() {
    let mut h = Harness::with(DiceSequencer::without_animation(DiceTimings::default()));
    h.roll();
    assert_eq!(h.seq.phase(), Phase::Idle);

    h.result(15, "");
    h.result(16, "");
    h.run_until_idle();

    assert_eq!(h.restarts, 0);
    assert_eq!(h.reveals, vec![(0, 15), (3600, 16)]);
}
