//! Playback session: one engine per block on a shared clock.
//!
//! The session owns the [`TickSourceAllocator`], so tick-source ids are unique
//! within it, and routes each delivered tick to the engine it belongs to.

use std::collections::BTreeMap;

use log::debug;

use crate::clock::{Clock, TickSourceAllocator, TickSourceId};
use crate::engine::{EngineError, PlaybackEngine, Repeat, TickOutcome};
use crate::midi::{MidiError, MidiOut, MidiSink};
use crate::render::RenderSurface;
use crate::score::{Block, CompileTimeConfig, CompiledScore};

pub struct Session<S: MidiSink> {
    allocator: TickSourceAllocator,
    engines: BTreeMap<TickSourceId, PlaybackEngine<S>>,
}

impl<S: MidiSink> Default for Session<S> {
    fn default() -> Self {
        Self {
            allocator: TickSourceAllocator::new(),
            engines: BTreeMap::new(),
        }
    }
}

impl<S: MidiSink> Session<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One engine per block of `score`.
    ///
    /// `open_midi` is asked for a sink for each engine when the score enables
    /// MIDI; each engine owns the sink it gets.
    pub fn from_score<F>(
        score: &CompiledScore,
        repeat: Repeat,
        mut open_midi: F,
    ) -> Result<Self, MidiError>
    where
        F: FnMut(TickSourceId) -> Result<Option<MidiOut<S>>, MidiError>,
    {
        let mut session = Self::new();
        for block in &score.program.blocks {
            let id = session.allocator.allocate();
            let midi = if score.config.midi_enabled {
                open_midi(id)?
            } else {
                None
            };
            session.insert(id, &score.config, block, repeat, midi);
        }
        Ok(session)
    }

    /// Add an engine for `block` and return its tick source.
    pub fn add_engine(
        &mut self,
        config: &CompileTimeConfig,
        block: &Block,
        repeat: Repeat,
        midi: Option<MidiOut<S>>,
    ) -> TickSourceId {
        let id = self.allocator.allocate();
        self.insert(id, config, block, repeat, midi);
        id
    }

    fn insert(
        &mut self,
        id: TickSourceId,
        config: &CompileTimeConfig,
        block: &Block,
        repeat: Repeat,
        midi: Option<MidiOut<S>>,
    ) {
        let engine = PlaybackEngine::new(id, config, block, repeat, midi);
        self.engines.insert(id, engine);
    }

    /// Start every engine.
    pub fn start(&mut self, clock: &mut dyn Clock, surface: &mut dyn RenderSurface) {
        for engine in self.engines.values_mut() {
            engine.start(clock, surface);
        }
    }

    /// Deliver one tick from `source`.
    pub fn tick(
        &mut self,
        source: TickSourceId,
        clock: &mut dyn Clock,
        surface: &mut dyn RenderSurface,
    ) -> Result<TickOutcome, EngineError> {
        match self.engines.get_mut(&source) {
            Some(engine) => engine.tick(clock, surface),
            None => {
                debug!("ignoring tick from unknown source {source}");
                Ok(TickOutcome::Idle)
            }
        }
    }

    /// Whether every engine has finished.
    pub fn is_done(&self) -> bool {
        self.engines.values().all(PlaybackEngine::is_done)
    }

    pub fn engine(&self, id: TickSourceId) -> Option<&PlaybackEngine<S>> {
        self.engines.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TickSourceId> + '_ {
        self.engines.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Close every engine, silencing active notes, and return the sinks.
    ///
    /// All engines are closed even if one fails; the first failure is returned.
    pub fn close(self) -> Result<Vec<S>, MidiError> {
        let mut sinks = Vec::new();
        let mut first_err = None;
        for (_, engine) in self.engines {
            match engine.close() {
                Ok(Some(sink)) => sinks.push(sink),
                Ok(None) => {}
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(sinks),
        }
    }
}
