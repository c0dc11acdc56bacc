//! Errors raised while decoding and compiling a score.
//!
//! Every variant is fatal: compilation stops at the first error and no
//! partial program is returned. Block and state locations are 0-based and
//! count runtime blocks only (the configuration block is not numbered).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// The score could not be decomposed at all.
    #[error("Malformed score: {0}")]
    MalformedScore(String),

    /// A configuration key is not recognized.
    #[error("Unknown command '{key}' in configuration block")]
    UnknownCommand { key: String },

    /// A setup key inside a runtime block is not recognized.
    #[error("Invalid command '{key}' in block {block}, state {state}")]
    InvalidCommand {
        key: String,
        block: usize,
        state: usize,
    },

    /// A command is missing its assign delimiter or its value does not parse.
    #[error("Malformed command '{command}': {reason}")]
    MalformedCommand { command: String, reason: String },

    /// A play row contains a character other than `0` or `1`.
    #[error("Invalid light status '{found}' in block {block}, state {state}")]
    InvalidLightStatus {
        found: char,
        block: usize,
        state: usize,
    },

    /// The configuration block never sets the grid shape.
    #[error("Configuration block has no grid shape (S:COLSxROWS)")]
    MissingGridShape,
}

impl ScoreError {
    pub(crate) fn malformed(command: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCommand {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
