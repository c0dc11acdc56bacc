//! Playback engine: advances one block's states, one state per tick.
//!
//! Each tick pops the next [`State`], applies its setup commands (tempo and
//! color channels) and then its play rows. Row `r` drives the cells from
//! `r * cols` onward; bits past the last column and rows past the last grid
//! row are ignored.
//! Lights go to a [`RenderSurface`]; notes go to an optional [`MidiOut`].
//!
//! The engine does not own time. It asks a [`Clock`] for ticks on its
//! [`TickSourceId`], reschedules on tempo changes and cancels itself when the
//! program is exhausted.

pub mod grid;
pub mod stream;

pub use grid::{Grid, NoteRecord, NoteTable};
pub use stream::{MidiStreamUnderrun, NoteStream};

use log::{info, warn};
use thiserror::Error;

use crate::clock::{Clock, TickSourceId};
use crate::midi::{MidiError, MidiOut, MidiSink};
use crate::render::RenderSurface;
use crate::score::{bpm_to_ms, Block, Command, CompileTimeConfig, Light, Rgb, State};

/// How many times a block's states are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Play `n` times in full; 0 and 1 both mean once.
    Times(u32),
    /// Replay until torn down.
    Forever,
}

impl Repeat {
    pub const ONCE: Repeat = Repeat::Times(1);

    fn total_ticks(self, states: usize) -> Option<usize> {
        match self {
            Repeat::Times(n) => Some(states * n.max(1) as usize),
            Repeat::Forever if states == 0 => Some(0),
            Repeat::Forever => None,
        }
    }
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Running,
    Done,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Midi(#[from] MidiError),
}

/// What one advanced tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Position of the applied state in the (possibly repeated) program.
    pub position: usize,
    /// Lit cells that emitted no note for lack of parameters.
    pub underruns: Vec<MidiStreamUnderrun>,
}

/// The result of delivering one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A state was applied.
    Advanced(TickReport),
    /// The program was exhausted on this tick; ticks have been cancelled.
    Completed,
    /// The engine was already done.
    Idle,
}

/// Plays one block on its own grid.
pub struct PlaybackEngine<S: MidiSink> {
    id: TickSourceId,
    grid: Grid,
    notes: NoteTable,
    states: Vec<State>,
    total_ticks: Option<usize>,
    position: usize,
    color: Rgb,
    interval_ms: u64,
    phase: EnginePhase,
    midi: Option<MidiOut<S>>,
}

impl<S: MidiSink> PlaybackEngine<S> {
    /// Build an engine for `block`.
    ///
    /// MIDI is only driven when the score enables it and a sink is given.
    pub fn new(
        id: TickSourceId,
        config: &CompileTimeConfig,
        block: &Block,
        repeat: Repeat,
        midi: Option<MidiOut<S>>,
    ) -> Self {
        let midi = match midi {
            Some(out) if config.midi_enabled => Some(out),
            Some(_) => {
                info!("{id}: score does not enable MIDI, releasing sink");
                None
            }
            None => None,
        };
        let cells = config.cell_count();

        Self {
            id,
            grid: Grid::new(config.grid_cols, config.grid_rows),
            notes: NoteTable::new(cells),
            states: block.states.clone(),
            total_ticks: repeat.total_ticks(block.states.len()),
            position: 0,
            color: Rgb::BLACK,
            interval_ms: config.interval_ms(),
            phase: EnginePhase::Running,
            midi,
        }
    }

    /// Blank the grid and ask the clock for ticks at the initial interval.
    pub fn start(&mut self, clock: &mut dyn Clock, surface: &mut dyn RenderSurface) {
        for cell in 0..self.grid.len() {
            self.grid.fill(cell, Rgb::BLACK);
            surface.fill_cell(cell, Rgb::BLACK);
        }
        info!(
            "{}: starting {} state(s) at {}ms",
            self.id,
            self.states.len(),
            self.interval_ms
        );
        clock.schedule(self.id, self.interval_ms);
    }

    /// Handle one tick: apply exactly one state, or finish.
    pub fn tick(
        &mut self,
        clock: &mut dyn Clock,
        surface: &mut dyn RenderSurface,
    ) -> Result<TickOutcome, EngineError> {
        if self.phase == EnginePhase::Done {
            return Ok(TickOutcome::Idle);
        }

        let exhausted = self.total_ticks.is_some_and(|total| self.position >= total);
        if exhausted {
            self.phase = EnginePhase::Done;
            clock.cancel(self.id);
            info!("{}: sequence complete after {} tick(s)", self.id, self.position);
            return Ok(TickOutcome::Completed);
        }

        let position = self.position;
        let state = &self.states[position % self.states.len()];

        for cmd in state.setup_commands() {
            match *cmd {
                Command::SetTempo { bpm } => {
                    self.interval_ms = bpm_to_ms(bpm);
                    clock.schedule(self.id, self.interval_ms);
                }
                Command::SetColorChannel { channel, value } => {
                    self.color.set_channel(channel, value);
                }
                Command::PlayRow { .. } => {}
            }
        }

        let cols = self.grid.cols() as usize;
        let rows = self.grid.rows() as usize;
        let mut underruns = Vec::new();
        for (row, cmd) in state.play_commands().enumerate() {
            let Command::PlayRow { bits, midi } = cmd else {
                continue;
            };
            if row >= rows {
                warn!("{}: row {row} is outside the {rows}-row grid, skipped", self.id);
                continue;
            }
            if bits.len() > cols {
                warn!(
                    "{}: row {row} has {} bits for {cols} column(s), extra bits ignored",
                    self.id,
                    bits.len()
                );
            }
            let notes = midi.as_ref().map(|d| d.notes.as_slice()).unwrap_or_default();
            let mut stream = NoteStream::new(notes);

            for (col, light) in bits.iter().take(cols).enumerate() {
                let cell = row * cols + col;
                match light {
                    Light::Off => {
                        self.grid.fill(cell, Rgb::BLACK);
                        surface.fill_cell(cell, Rgb::BLACK);
                        if let Some(note) = self.notes.take(cell) {
                            if let Some(out) = self.midi.as_mut() {
                                out.note_off(note.pitch, 0, note.channel)?;
                            }
                        }
                    }
                    Light::On => {
                        if let Some(out) = self.midi.as_mut() {
                            match stream.next_for(cell) {
                                Ok(params) => {
                                    out.note_on(params.pitch, params.velocity, params.channel)?;
                                    self.notes.set(cell, params.into());
                                }
                                Err(underrun) => {
                                    warn!("{}: {underrun}", self.id);
                                    underruns.push(underrun);
                                }
                            }
                        }
                        self.grid.fill(cell, self.color);
                        surface.fill_cell(cell, self.color);
                    }
                }
            }
        }

        self.position += 1;
        Ok(TickOutcome::Advanced(TickReport {
            position,
            underruns,
        }))
    }

    /// Send note-off for every active note and clear the table.
    pub fn release_notes(&mut self) -> Result<usize, MidiError> {
        let active = self.notes.drain();
        if let Some(out) = self.midi.as_mut() {
            for (_, note) in &active {
                out.note_off(note.pitch, 0, note.channel)?;
            }
        }
        Ok(active.len())
    }

    /// Tear down: silence active notes, then hand back the MIDI sink.
    pub fn close(mut self) -> Result<Option<S>, MidiError> {
        let released = self.release_notes()?;
        if released > 0 {
            info!("{}: released {released} note(s)", self.id);
        }
        Ok(self.midi.take().map(MidiOut::into_inner))
    }

    pub fn id(&self) -> TickSourceId {
        self.id
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == EnginePhase::Done
    }

    /// Current base color.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Current tick interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Number of states applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Ticks that apply a state before completion, `None` when unbounded.
    pub fn total_ticks(&self) -> Option<usize> {
        self.total_ticks
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn notes(&self) -> &NoteTable {
        &self.notes
    }

    pub fn midi_enabled(&self) -> bool {
        self.midi.is_some()
    }
}

impl<S: MidiSink> Drop for PlaybackEngine<S> {
    fn drop(&mut self) {
        if self.notes.active_count() == 0 {
            return;
        }
        if let Err(e) = self.release_notes() {
            warn!("{}: failed to release notes on drop: {e}", self.id);
        }
    }
}
