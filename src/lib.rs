//! Qust: compiles a light-grid score into timed grid and MIDI events.
//!
//! Score text goes through the [`score::Compiler`] into a
//! [`score::CompiledScore`]; a [`session::Session`] then plays each block on
//! its own [`engine::PlaybackEngine`], one state per externally delivered tick.

pub mod clock;
pub mod config;
pub mod engine;
pub mod midi;
pub mod render;
pub mod score;
pub mod session;

#[cfg(test)]
mod testing;
