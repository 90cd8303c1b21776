use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::item::ItemId;

/// Everything that can come due on the game's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// once-a-second countdown tick
    Clock,
    /// spawner tick, period is the session's current spawn delay
    Spawn,
    /// an item reached the top of the play area
    Escape(ItemId),
    /// hit animation finished, the item can be removed
    HitAnimation(ItemId),
    /// end of the red border flash after a wrong key
    FlashEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Duration,
    seq: u64,
    kind: TimerKind,
}

/// Single-threaded timer queue over a virtual clock.
///
/// Timers fire in due order; timers due at the same instant fire in the
/// order they were scheduled.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_in(&mut self, delay: Duration, kind: TimerKind) {
        self.seq += 1;
        self.queue.push(Reverse(Scheduled {
            due: self.now + delay,
            seq: self.seq,
            kind,
        }));
    }

    /// Drop every pending timer matching `pred`
    pub fn cancel<F>(&mut self, pred: F)
    where
        F: Fn(&TimerKind) -> bool,
    {
        self.queue.retain(|Reverse(s)| !pred(&s.kind));
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Rewind to zero with an empty queue
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now = Duration::ZERO;
        self.seq = 0;
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerKind> {
        match self.queue.peek() {
            Some(Reverse(next)) if next.due <= until => {}
            _ => return None,
        }
        let Reverse(next) = self.queue.pop()?;
        self.now = self.now.max(next.due);
        Some(next.kind)
    }

    /// Moves the clock forward without firing anything
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}
