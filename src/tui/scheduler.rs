//! Refresh cadences, one timer each.
//!
//! Each cadence is its own tokio interval so their phases never drift into
//! each other. Ticks always fire; whether they do anything is decided by
//! [`gate`]. A gated tick is dropped, and missed ticks are skipped rather
//! than burst, so nothing is replayed after a pause.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::event::Redraw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Timestamp only.
    Clock,
    /// Stock quotes.
    Quotes,
    /// Market header.
    Market,
}

impl Cadence {
    pub const fn period(self) -> Duration {
        match self {
            Cadence::Clock => Duration::from_secs(1),
            Cadence::Quotes => Duration::from_secs(5),
            Cadence::Market => Duration::from_secs(12),
        }
    }

    fn redraw(self) -> Redraw {
        match self {
            Cadence::Clock => Redraw::Clock,
            Cadence::Quotes => Redraw::Quotes,
            Cadence::Market => Redraw::Market,
        }
    }
}

/// The redraw a tick should cause, or `None` while help is up or paused.
pub fn gate(cadence: Cadence, showing_help: bool, paused: bool) -> Option<Redraw> {
    if showing_help || paused {
        None
    } else {
        Some(cadence.redraw())
    }
}

pub struct RefreshScheduler {
    clock: Interval,
    quotes: Interval,
    market: Interval,
}

impl RefreshScheduler {
    /// Start all three timers now. First ticks land one period from now.
    pub fn start() -> Self {
        Self {
            clock: timer(Cadence::Clock),
            quotes: timer(Cadence::Quotes),
            market: timer(Cadence::Market),
        }
    }

    /// Wait for whichever cadence fires next. Cancel-safe.
    pub async fn next(&mut self) -> Cadence {
        tokio::select! {
            _ = self.clock.tick() => Cadence::Clock,
            _ = self.quotes.tick() => Cadence::Quotes,
            _ = self.market.tick() => Cadence::Market,
        }
    }
}

fn timer(cadence: Cadence) -> Interval {
    let period = cadence.period();
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}
