//! Score compiler: notation text → configuration + runtime program.

pub mod ast;
pub mod compile;
pub mod error;
pub mod lexer;
pub mod syntax;

use std::path::Path;

pub use ast::*;
pub use error::ScoreError;

use compile::{backfill_first_states, compile_runtime, parse_config};
use lexer::{decode_score, split_blocks};

/// The score compiler.
///
/// Splits the text into blocks, decodes the first one as configuration and
/// compiles the rest into a [`RuntimeProgram`]. Any error aborts the whole
/// compilation.
pub struct Compiler;

impl Compiler {
    /// Compile score text.
    pub fn compile(text: &str) -> Result<CompiledScore, ScoreError> {
        let blocks = split_blocks(text)?;
        let (config_block, runtime_blocks) = blocks
            .split_first()
            .ok_or_else(|| ScoreError::MalformedScore("score has no blocks".into()))?;

        let config = parse_config(config_block)?;
        let mut program = compile_runtime(runtime_blocks, config.midi_enabled)?;
        backfill_first_states(&mut program, config.color);

        log::debug!(
            "compiled {} block(s) for a {}x{} grid",
            program.blocks.len(),
            config.grid_cols,
            config.grid_rows
        );
        Ok(CompiledScore { config, program })
    }

    /// Compile raw score bytes.
    pub fn compile_bytes(bytes: &[u8]) -> Result<CompiledScore, ScoreError> {
        Self::compile(decode_score(bytes)?)
    }

    /// Read a score file completely and compile it.
    pub fn load(path: impl AsRef<Path>) -> Result<CompiledScore, ScoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ScoreError::MalformedScore(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::compile_bytes(&bytes)
    }
}
