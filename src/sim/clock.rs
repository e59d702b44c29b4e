//! Millisecond clock with periodic and one-shot timers
//!
//! The round never reads wall time. The host advances the clock and the round
//! pops due timers one at a time, so handlers observe `now_ms` equal to the
//! timer's due time and may register or cancel timers while draining.

use serde::{Deserialize, Serialize};

pub type TimerId = u32;

/// Which driver a timer feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Physics integrator + effect pruning
    Frame,
    /// Spawn scheduler
    Spawn,
    /// Round countdown
    RoundSecond,
    /// Quiz countdown
    QuizSecond,
    /// End of quiz input lock
    QuizWarmUp,
    /// End of quiz verdict display
    QuizReveal,
    /// Delayed round end after a bomb
    BombFuse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due_ms: u64,
    /// None for one-shot timers
    period_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clock {
    now_ms: u64,
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire `kind` every `period_ms`, first at now + period
    pub fn every(&mut self, period_ms: u64, kind: TimerKind) -> TimerId {
        let period_ms = period_ms.max(1);
        self.push(kind, self.now_ms + period_ms, Some(period_ms))
    }

    /// Fire `kind` once, `delay_ms` from now
    pub fn after(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId {
        self.push(kind, self.now_ms + delay_ms, None)
    }

    fn push(&mut self, kind: TimerKind, due_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            due_ms,
            period_ms,
        });
        id
    }

    /// Returns true if the timer was still scheduled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving `now` to its
    /// due time. Ties resolve in registration order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, TimerKind)> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = &mut self.timers[idx];
        let fired = (timer.id, timer.kind);
        self.now_ms = self.now_ms.max(timer.due_ms);
        match timer.period_ms {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move `now` forward once nothing else is due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
