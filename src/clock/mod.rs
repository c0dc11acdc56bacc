//! Tick sources: the external clock contract and tick-source identity.
//!
//! Engines never drive their own time. Each engine is addressed by a
//! [`TickSourceId`] and asks a [`Clock`] to deliver ticks at an interval,
//! or to stop delivering them.

pub mod interval;

pub use interval::IntervalClock;

use std::fmt;

use serde::Serialize;

/// Identifies one tick source (one engine) on a shared clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TickSourceId(pub u32);

impl fmt::Display for TickSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick-{}", self.0)
    }
}

/// Hands out unique, monotonically increasing tick-source ids.
#[derive(Debug, Default)]
pub struct TickSourceAllocator {
    next: u32,
}

impl TickSourceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> TickSourceId {
        self.next += 1;
        TickSourceId(self.next)
    }
}

/// A periodic tick facility shared by several engines.
pub trait Clock {
    /// Deliver ticks for `source` every `interval_ms`, replacing any previous
    /// interval. The first tick at the new interval is the next one delivered.
    fn schedule(&mut self, source: TickSourceId, interval_ms: u64);

    /// Stop delivering ticks for `source`. Cancelling twice is harmless.
    fn cancel(&mut self, source: TickSourceId);
}
