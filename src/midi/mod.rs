//! MIDI adapter: note messages encoded for an external MIDI sink.

pub mod config;
pub mod output;

pub use config::MidiConfig;
pub use output::MidiPort;

use thiserror::Error;

/// Status nibble of a Note Off message.
pub const NOTE_OFF: u8 = 0x80;
/// Status nibble of a Note On message.
pub const NOTE_ON: u8 = 0x90;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MidiError {
    #[error("MIDI init: {0}")]
    Init(String),
    #[error("MIDI device matching '{0}' not found")]
    PortNotFound(String),
    #[error("MIDI connect: {0}")]
    Connect(String),
    #[error("MIDI send: {0}")]
    Send(String),
}

/// Anything that accepts raw MIDI bytes.
pub trait MidiSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError>;
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        (**self).send(bytes)
    }
}

/// Encode a 3-byte channel message.
///
/// `channel` is 1-based; data bytes are masked to 7 bits.
pub fn channel_message(command: u8, note: u8, velocity: u8, channel: u8) -> [u8; 3] {
    [
        (command & 0xF0) | (channel.wrapping_sub(1) & 0x0F),
        note & 0x7F,
        velocity & 0x7F,
    ]
}

/// Note-level wrapper over a [`MidiSink`].
///
/// Messages go straight to the sink: no buffering, no retry.
#[derive(Debug)]
pub struct MidiOut<S> {
    sink: S,
}

impl<S: MidiSink> MidiOut<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, channel: u8) -> Result<(), MidiError> {
        self.sink
            .send(&channel_message(NOTE_ON, note, velocity, channel))
    }

    pub fn note_off(&mut self, note: u8, velocity: u8, channel: u8) -> Result<(), MidiError> {
        self.sink
            .send(&channel_message(NOTE_OFF, note, velocity, channel))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the sink, e.g. to close the underlying port.
    pub fn into_inner(self) -> S {
        self.sink
    }
}
