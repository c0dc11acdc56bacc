//! Compiled score types: configuration plus the runtime program.

use serde::Serialize;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channel(self, channel: ColorChannel) -> u8 {
        match channel {
            ColorChannel::Red => self.r,
            ColorChannel::Green => self.g,
            ColorChannel::Blue => self.b,
        }
    }

    pub fn set_channel(&mut self, channel: ColorChannel, value: u8) {
        match channel {
            ColorChannel::Red => self.r = value,
            ColorChannel::Green => self.g = value,
            ColorChannel::Blue => self.b = value,
        }
    }
}

/// One channel of the base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 3] = [Self::Red, Self::Green, Self::Blue];
}

/// Settings decoded from the configuration block. Immutable after compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileTimeConfig {
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub canvas_w: u32,
    pub canvas_h: u32,
    pub color: Rgb,
    pub tempo_bpm: u32,
    pub midi_enabled: bool,
}

impl CompileTimeConfig {
    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.grid_cols as usize * self.grid_rows as usize
    }

    /// Initial tick interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        bpm_to_ms(self.tempo_bpm)
    }
}

/// Tick interval for a tempo. `bpm` is never zero after compilation.
pub fn bpm_to_ms(bpm: u32) -> u64 {
    60_000 / u64::from(bpm.max(1))
}

/// The status of one light in a play row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Light {
    Off,
    On,
}

impl Light {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '0' => Some(Self::Off),
            '1' => Some(Self::On),
            _ => None,
        }
    }
}

/// Note parameters bound to one "on" light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteParams {
    pub pitch: u8,
    pub velocity: u8,
    /// 1-based MIDI channel as written in the score.
    pub channel: u8,
}

/// A row's MIDI descriptor: the text as written and the tuples bound from it.
///
/// `notes` holds one entry per "on" light the descriptor provides for,
/// in left-to-right order. It may be shorter than the number of lit cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiDescriptor {
    pub text: String,
    pub notes: Vec<NoteParams>,
}

/// A single compiled command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    SetColorChannel { channel: ColorChannel, value: u8 },
    SetTempo { bpm: u32 },
    PlayRow {
        bits: Vec<Light>,
        midi: Option<MidiDescriptor>,
    },
}

impl Command {
    /// Setup commands are applied before play commands within a state.
    pub fn is_setup(&self) -> bool {
        !matches!(self, Command::PlayRow { .. })
    }
}

/// One tick's worth of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct State {
    pub commands: Vec<Command>,
}

impl State {
    pub fn setup_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.is_setup())
    }

    pub fn play_commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| !c.is_setup())
    }

    /// Whether the state sets the given color channel.
    pub fn sets_channel(&self, channel: ColorChannel) -> bool {
        self.commands.iter().any(|c| {
            matches!(c, Command::SetColorChannel { channel: ch, .. } if *ch == channel)
        })
    }
}

/// The timeline of one independently playable grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
    pub states: Vec<State>,
}

/// All runtime blocks of a score, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeProgram {
    pub blocks: Vec<Block>,
}

/// The result of compiling a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledScore {
    pub config: CompileTimeConfig,
    pub program: RuntimeProgram,
}
