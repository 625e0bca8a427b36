use super::Timer;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Pending sequencer timers ordered by deadline.
///
/// Timers with the same deadline fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<(Instant, u64), Timer>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, timer: Timer, after: Duration) {
        self.pending.insert((now + after, self.seq), timer);
        self.seq += 1;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return every timer due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Timer> {
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::TimerKind;

    fn timer(kind: TimerKind, job: u64) -> Timer {
        Timer { kind, job }
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut queue = TimerQueue::new();
        let now = Instant::now();

        queue.schedule(now, timer(TimerKind::BeginDrain, 1), Duration::from_millis(3000));
        queue.schedule(now, timer(TimerKind::RevealDescription, 1), Duration::from_millis(750));
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(750)));

        assert!(queue.pop_due(now).is_empty());
        assert_eq!(
            queue.pop_due(now + Duration::from_millis(750)),
            vec![timer(TimerKind::RevealDescription, 1)]
        );
        assert_eq!(
            queue.pop_due(now + Duration::from_secs(10)),
            vec![timer(TimerKind::BeginDrain, 1)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let mut queue = TimerQueue::new();
        let now = Instant::now();
        let delay = Duration::from_millis(100);

        queue.schedule(now, timer(TimerKind::Settle, 2), delay);
        queue.schedule(now, timer(TimerKind::FinishDrain, 1), delay);

        assert_eq!(
            queue.pop_due(now + delay),
            vec![timer(TimerKind::Settle, 2), timer(TimerKind::FinishDrain, 1)]
        );
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut queue = TimerQueue::new();
        let now = Instant::now();
        queue.schedule(now, timer(TimerKind::Settle, 1), Duration::from_secs(1));
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.next_deadline().is_none());
    }
}
