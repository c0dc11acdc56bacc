//! In-memory clock, surface and MIDI sinks shared by the unit tests.

use std::io;

use crate::clock::{Clock, TickSourceId};
use crate::midi::{MidiError, MidiSink};
use crate::render::RenderSurface;
use crate::score::Rgb;

/// Keeps every 3-byte message it is sent.
#[derive(Debug, Default)]
pub struct Recorder(pub Vec<[u8; 3]>);

impl MidiSink for Recorder {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.0.push([bytes[0], bytes[1], bytes[2]]);
        Ok(())
    }
}

/// Rejects every message.
#[derive(Debug, Default)]
pub struct FailingSink;

impl MidiSink for FailingSink {
    fn send(&mut self, _bytes: &[u8]) -> Result<(), MidiError> {
        Err(MidiError::Send("port gone".into()))
    }
}

#[derive(Debug, Default)]
pub struct TestClock {
    pub scheduled: Vec<(TickSourceId, u64)>,
    pub cancelled: Vec<TickSourceId>,
}

impl Clock for TestClock {
    fn schedule(&mut self, source: TickSourceId, interval_ms: u64) {
        self.scheduled.push((source, interval_ms));
    }

    fn cancel(&mut self, source: TickSourceId) {
        self.cancelled.push(source);
    }
}

#[derive(Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn fill_cell(&mut self, _cell: usize, _color: Rgb) {}

    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}
