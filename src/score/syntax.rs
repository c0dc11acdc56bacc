//! Delimiters and keywords of the score notation.

/// Separates the configuration block and each runtime block.
pub const BLOCK: char = '>';
/// Closes a state.
pub const STATE_CLOSE: char = '*';
/// Closes a command group inside a state.
pub const COMMAND_CLOSE: char = ';';
/// Joins commands (or MIDI parameter groups) into a string.
pub const COMMAND_STRING: char = '&';
/// Separates a key from its value.
pub const ASSIGN: char = ':';
/// Separates the two dimensions of a shape value.
pub const MATRIX: char = 'x';
/// Separates the bits of a row from its MIDI descriptor.
pub const MIDI_FIELD: char = '|';
/// Separates the per-light values inside one MIDI parameter group.
pub const MIDI_PARAM: char = '+';

/// Characters that open a play group.
pub const BIT_CHARS: [char; 2] = ['0', '1'];

/// Recognized command keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Red,
    Green,
    Blue,
    Tempo,
    GridShape,
    CanvasShape,
    MidiEnable,
}

impl Keyword {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "R" => Some(Self::Red),
            "G" => Some(Self::Green),
            "B" => Some(Self::Blue),
            "BPM" => Some(Self::Tempo),
            "S" => Some(Self::GridShape),
            "W" => Some(Self::CanvasShape),
            "MD" => Some(Self::MidiEnable),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "R",
            Self::Green => "G",
            Self::Blue => "B",
            Self::Tempo => "BPM",
            Self::GridShape => "S",
            Self::CanvasShape => "W",
            Self::MidiEnable => "MD",
        }
    }

    /// Whether the value is written in matrix form (`INTxINT`).
    pub fn takes_matrix(self) -> bool {
        matches!(self, Self::GridShape | Self::CanvasShape)
    }
}

/// Whether a command group encodes play rows rather than setup commands.
pub fn starts_with_bit(group: &str) -> bool {
    group.starts_with(BIT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_roundtrip() {
        for kw in [
            Keyword::Red,
            Keyword::Green,
            Keyword::Blue,
            Keyword::Tempo,
            Keyword::GridShape,
            Keyword::CanvasShape,
            Keyword::MidiEnable,
        ] {
            assert_eq!(Keyword::from_key(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn unknown_key() {
        assert_eq!(Keyword::from_key("P"), None);
        assert_eq!(Keyword::from_key("r"), None);
    }

    #[test]
    fn play_group_detection() {
        assert!(starts_with_bit("0101"));
        assert!(starts_with_bit("1|60&100&1"));
        assert!(!starts_with_bit("R:255"));
        assert!(!starts_with_bit(""));
    }
}
