//! Tick sources: what decides when a tick is due.
//!
//! The session never owns a timer. A [`TickSource`] is told how much wall
//! time passed and answers with the number of ticks now due; the session runs
//! exactly that many, one at a time. Stopping a source discards any partial
//! period, so pause/resume never carries progress over.

use std::time::Duration;

/// A periodic tick source that can be started and stopped.
pub trait TickSource {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
    /// Feed elapsed wall time and return the number of ticks now due.
    /// Always 0 while stopped.
    fn poll(&mut self, elapsed: Duration) -> u64;
}

// ---------------------------------------------------------------------------
// FixedInterval
// ---------------------------------------------------------------------------

/// Accumulates elapsed time and yields one tick per whole period, carrying
/// the remainder forward while active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInterval {
    period: Duration,
    accumulator: Duration,
    active: bool,
}

impl FixedInterval {
    /// A stopped source with the given period. A zero period is clamped to
    /// one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
            active: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time accumulated toward the next tick.
    pub fn pending(&self) -> Duration {
        self.accumulator
    }
}

impl TickSource for FixedInterval {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
        self.accumulator = Duration::ZERO;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self, elapsed: Duration) -> u64 {
        if !self.active {
            return 0;
        }
        self.accumulator += elapsed;
        let due = self.accumulator.as_nanos() / self.period.as_nanos();
        self.accumulator -= self.period * due as u32;
        due as u64
    }
}

// ---------------------------------------------------------------------------
// ManualTicks
// ---------------------------------------------------------------------------

/// A source that ignores wall time and yields whatever ticks were queued.
/// Lets tests drive a session tick by tick through the same code path as a
/// real timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualTicks {
    queued: u64,
    active: bool,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `n` more ticks for the next poll.
    pub fn queue(&mut self, n: u64) {
        self.queued += n;
    }
}

impl TickSource for ManualTicks {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
        self.queued = 0;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self, _elapsed: Duration) -> u64 {
        if !self.active {
            return 0;
        }
        std::mem::take(&mut self.queued)
    }
}
