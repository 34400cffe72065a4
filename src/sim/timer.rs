//! Epoch-tagged timers driven by the host loop
//!
//! Time only moves when the session ticks, so cooldowns and polls are
//! deterministic. Every timer remembers the epoch it was armed in; a restart
//! bumps the epoch and anything armed earlier is dropped when it comes due.

use serde::Serialize;

use super::state::EntityId;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerEvent {
    /// Drop cooldown elapsed
    DropReady,
    /// Grace period of a new cat elapsed
    TrackForOverflow(EntityId),
    /// Time for a game-over poll
    OverflowPoll,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due: f64,
    epoch: u64,
    event: TimerEvent,
}

/// Simulated clock plus pending one-shot timers
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    epoch: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer `delay` seconds from now in the current epoch
    pub fn schedule(&mut self, delay: f32, event: TimerEvent) {
        self.pending.push(Scheduled {
            due: self.now + f64::from(delay.max(0.0)),
            epoch: self.epoch,
            event,
        });
    }

    /// Advance the clock and return timers that came due, earliest first.
    /// Timers from an older epoch are discarded.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerEvent> {
        self.now += f64::from(dt.max(0.0));

        let now = self.now;
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|t| {
            if t.due <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });

        // stable: equal due times keep arming order
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        let epoch = self.epoch;
        due.into_iter()
            .filter(|t| t.epoch == epoch)
            .map(|t| t.event)
            .collect()
    }

    /// Start a new epoch; timers armed before this will never fire
    pub fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Seconds of simulated time since creation
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Timers still waiting, including stale ones not yet reaped
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
