//! Clock/timer driver — phase and apparatus intervals.
//!
//! DESIGN
//! ======
//! Two periodic timers: phase every `phase_every`, apparatus every three
//! phases. They are armed together and cancelled together. `start` always
//! stops first, so there is never more than one pair of timers, and it arms
//! nothing when the session is paused.
//!
//! Both intervals count from the `start` instant: the first phase tick lands
//! one full period later, never immediately. When both are due at the same
//! instant the phase tick is delivered first.
//!
//! `next` is cancel-safe (`Interval::tick` is), so the session task can
//! `select!` on it alongside its message queue.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::transition::Tick;

/// Number of phase periods per apparatus period.
pub const PHASES_PER_APPARATUS: u32 = 3;

struct Armed {
    phase: Interval,
    apparatus: Interval,
}

pub struct Ticker {
    phase_every: Duration,
    armed: Option<Armed>,
}

impl Ticker {
    /// Create a stopped ticker.
    #[must_use]
    pub fn new(phase_every: Duration) -> Self {
        Self { phase_every, armed: None }
    }

    #[must_use]
    pub fn phase_every(&self) -> Duration {
        self.phase_every
    }

    #[must_use]
    pub fn apparatus_every(&self) -> Duration {
        self.phase_every * PHASES_PER_APPARATUS
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Cancel both timers. No-op when nothing is armed.
    pub fn stop(&mut self) {
        self.armed = None;
    }

    /// Stop, then re-arm both timers from zero if `playing`.
    pub fn start(&mut self, playing: bool) {
        self.stop();
        if !playing {
            return;
        }

        let now = Instant::now();
        self.armed = Some(Armed {
            phase: arm(now, self.phase_every),
            apparatus: arm(now, self.apparatus_every()),
        });
    }

    /// Wait for the next tick. Pends forever while stopped.
    pub async fn next(&mut self) -> Tick {
        let Some(armed) = self.armed.as_mut() else {
            return std::future::pending().await;
        };

        tokio::select! {
            biased;
            _ = armed.phase.tick() => Tick::Phase,
            _ = armed.apparatus.tick() => Tick::Apparatus,
        }
    }
}

fn arm(now: Instant, period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(now + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
#[path = "ticker_test.rs"]
mod tests;
