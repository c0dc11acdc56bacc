//! Lexer for the score notation.
//!
//! Pure splitting functions that decompose score text into progressively
//! finer units, one delimiter per step:
//! blocks → states → command groups → commands / rows → MIDI parameters.

use super::error::ScoreError;
use super::syntax::{BLOCK, COMMAND_CLOSE, COMMAND_STRING, MIDI_FIELD, MIDI_PARAM, STATE_CLOSE};

/// Decode raw score bytes into text.
pub fn decode_score(bytes: &[u8]) -> Result<&str, ScoreError> {
    std::str::from_utf8(bytes).map_err(|e| {
        ScoreError::MalformedScore(format!(
            "score is not valid UTF-8 after byte {}",
            e.valid_up_to()
        ))
    })
}

/// Split a score into blocks. The first block is the configuration block.
pub fn split_blocks(text: &str) -> Result<Vec<&str>, ScoreError> {
    if text.trim().is_empty() {
        return Err(ScoreError::MalformedScore("score is empty".into()));
    }
    Ok(text.split(BLOCK).collect())
}

/// Split a block into trimmed state tokens.
///
/// Empty tokens (such as the one after a trailing state-close) are not states.
pub fn split_states(block: &str) -> Vec<&str> {
    block
        .split(STATE_CLOSE)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a state into trimmed command groups.
///
/// With more than one group, the leading groups hold setup commands and the
/// last one usually holds the play rows.
pub fn split_command_groups(state: &str) -> Vec<&str> {
    state.split(COMMAND_CLOSE).map(str::trim).collect()
}

/// Split a setup group (or a MIDI descriptor) on the command-string delimiter.
pub fn split_preproc_commands(group: &str) -> Vec<&str> {
    group.split(COMMAND_STRING).collect()
}

/// Split a play group into trimmed rows.
pub fn split_lines(group: &str) -> Vec<&str> {
    group.lines().map(str::trim).collect()
}

/// Split one MIDI parameter group into per-light values.
pub fn split_midi_params(field: &str) -> Vec<&str> {
    field.split(MIDI_PARAM).collect()
}

/// Split a play row into its bits and MIDI descriptor (empty when absent).
pub fn split_row_midi(row: &str) -> (&str, &str) {
    row.split_once(MIDI_FIELD).unwrap_or((row, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_keep_config_first() {
        let blocks = split_blocks("S:2x1>110*>01*").unwrap();
        assert_eq!(blocks, vec!["S:2x1", "110*", "01*"]);
    }

    #[test]
    fn empty_score_is_malformed() {
        assert!(matches!(
            split_blocks("  \n"),
            Err(ScoreError::MalformedScore(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = decode_score(&[b'S', b':', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ScoreError::MalformedScore(_)));
    }

    #[test]
    fn states_are_trimmed_and_trailing_dropped() {
        assert_eq!(split_states("\n110*\n101*\n"), vec!["110", "101"]);
        assert_eq!(split_states("110*101"), vec!["110", "101"]);
        assert!(split_states("  ").is_empty());
    }

    #[test]
    fn command_groups() {
        assert_eq!(
            split_command_groups("R:10&G:20; 11"),
            vec!["R:10&G:20", "11"]
        );
        assert_eq!(split_command_groups("11"), vec!["11"]);
    }

    #[test]
    fn lines_strip_carriage_returns() {
        assert_eq!(split_lines("10\r\n01"), vec!["10", "01"]);
    }

    #[test]
    fn midi_params() {
        assert_eq!(split_midi_params("60+62+64"), vec!["60", "62", "64"]);
        assert_eq!(split_preproc_commands("60+62&100+100&1+1").len(), 3);
    }

    #[test]
    fn row_without_descriptor() {
        assert_eq!(split_row_midi("0110"), ("0110", ""));
    }

    #[test]
    fn row_split_rejoins_to_original() {
        let row = "11|60+62&100+100&1+1";
        let (bits, desc) = split_row_midi(row);
        assert_eq!(bits, "11");
        assert_eq!(format!("{bits}{MIDI_FIELD}{desc}"), row);
    }
}
