//! Positional note stream for one play row.

use thiserror::Error;

use crate::score::NoteParams;

/// A lit cell found no note parameters left in its row's stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no MIDI parameters left for lit cell {cell}")]
pub struct MidiStreamUnderrun {
    pub cell: usize,
}

/// Hands out a row's note tuples in left-to-right order.
#[derive(Debug)]
pub struct NoteStream<'a> {
    notes: &'a [NoteParams],
    next: usize,
}

impl<'a> NoteStream<'a> {
    pub fn new(notes: &'a [NoteParams]) -> Self {
        Self { notes, next: 0 }
    }

    /// The tuple for the next lit cell.
    pub fn next_for(&mut self, cell: usize) -> Result<NoteParams, MidiStreamUnderrun> {
        let params = self
            .notes
            .get(self.next)
            .copied()
            .ok_or(MidiStreamUnderrun { cell })?;
        self.next += 1;
        Ok(params)
    }

    pub fn remaining(&self) -> usize {
        self.notes.len() - self.next
    }
}
