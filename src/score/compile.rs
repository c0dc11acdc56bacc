//! Score compiler: turns lexer output into a configuration and a runtime program.
//!
//! The configuration block is decoded by [`parse_config`]; every following
//! block is compiled into states of typed [`Command`]s by [`compile_runtime`].

use log::debug;

use super::ast::*;
use super::error::ScoreError;
use super::lexer::{
    split_command_groups, split_lines, split_midi_params, split_preproc_commands,
    split_row_midi, split_states,
};
use super::syntax::{starts_with_bit, Keyword, ASSIGN, MATRIX};

/// Tempo used when the configuration block has no `BPM`.
pub const DEFAULT_TEMPO_BPM: u32 = 120;
/// Canvas pixels per cell when the configuration block has no `W`.
pub const DEFAULT_CELL_PX: u32 = 32;

/// Decode the configuration block.
pub fn parse_config(config_block: &str) -> Result<CompileTimeConfig, ScoreError> {
    let mut grid = None;
    let mut canvas = None;
    let mut color = Rgb::BLACK;
    let mut tempo_bpm = DEFAULT_TEMPO_BPM;
    let mut midi_enabled = false;

    for token in split_preproc_commands(config_block.trim()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if Keyword::from_key(token) == Some(Keyword::MidiEnable) {
            midi_enabled = true;
            continue;
        }

        let (key, value) = split_assign(token)?;
        let keyword = Keyword::from_key(key).ok_or_else(|| ScoreError::UnknownCommand {
            key: key.to_string(),
        })?;

        match keyword {
            Keyword::GridShape => grid = Some(parse_matrix(token, value)?),
            Keyword::CanvasShape => canvas = Some(parse_matrix(token, value)?),
            Keyword::Red => color.r = parse_channel_value(token, value)?,
            Keyword::Green => color.g = parse_channel_value(token, value)?,
            Keyword::Blue => color.b = parse_channel_value(token, value)?,
            Keyword::Tempo => tempo_bpm = parse_bpm(token, value)?,
            Keyword::MidiEnable => {
                return Err(ScoreError::malformed(token, "MD takes no value"));
            }
        }
    }

    // Shapes are written cols x rows.
    let (grid_cols, grid_rows) = grid.ok_or(ScoreError::MissingGridShape)?;
    let (canvas_w, canvas_h) = match canvas {
        Some(shape) => shape,
        None => default_canvas(grid_cols, grid_rows)?,
    };

    Ok(CompileTimeConfig {
        grid_cols,
        grid_rows,
        canvas_w,
        canvas_h,
        color,
        tempo_bpm,
        midi_enabled,
    })
}

/// Canvas size when `W` is absent: [`DEFAULT_CELL_PX`] per cell.
fn default_canvas(cols: u32, rows: u32) -> Result<(u32, u32), ScoreError> {
    match (cols.checked_mul(DEFAULT_CELL_PX), rows.checked_mul(DEFAULT_CELL_PX)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ScoreError::malformed(
            &format!("{}{ASSIGN}{cols}{MATRIX}{rows}", Keyword::GridShape.as_str()),
            "grid too large for the default canvas, give W explicitly",
        )),
    }
}

/// Compile every runtime block. `blocks` excludes the configuration block.
pub fn compile_runtime(blocks: &[&str], midi_enabled: bool) -> Result<RuntimeProgram, ScoreError> {
    let blocks = blocks
        .iter()
        .enumerate()
        .map(|(block_idx, block)| compile_block(block, midi_enabled, block_idx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuntimeProgram { blocks })
}

/// Give the first state of every block an explicit value for each color
/// channel it leaves unset, taken from `base`.
pub fn backfill_first_states(program: &mut RuntimeProgram, base: Rgb) {
    for block in &mut program.blocks {
        let Some(first) = block.states.first_mut() else {
            continue;
        };
        for channel in ColorChannel::ALL {
            if !first.sets_channel(channel) {
                first.commands.push(Command::SetColorChannel {
                    channel,
                    value: base.channel(channel),
                });
            }
        }
    }
}

/// Bind a MIDI descriptor into per-light note tuples.
///
/// The descriptor holds parameter groups in the fixed order pitch, velocity,
/// channel. A group with any non-numeric value is dropped; the remaining
/// groups are zipped positionally and the shortest one bounds the result.
pub fn bind_midi_descriptor(text: &str) -> MidiDescriptor {
    let groups: Vec<Vec<f64>> = split_preproc_commands(text)
        .into_iter()
        .filter_map(|group| {
            let values: Option<Vec<f64>> = split_midi_params(group)
                .into_iter()
                .map(|v| v.trim().parse::<f64>().ok().filter(|f| f.is_finite()))
                .collect();
            if values.is_none() {
                debug!("dropping MIDI parameter group '{group}'");
            }
            values
        })
        .collect();

    let notes = match groups.as_slice() {
        [pitches, velocities, channels, ..] => pitches
            .iter()
            .zip(velocities)
            .zip(channels)
            .map(|((&p, &v), &c)| NoteParams {
                pitch: to_byte(p),
                velocity: to_byte(v),
                channel: to_byte(c),
            })
            .collect(),
        _ => {
            debug!("MIDI descriptor '{text}' has fewer than 3 usable groups");
            Vec::new()
        }
    };

    MidiDescriptor {
        text: text.to_string(),
        notes,
    }
}

fn compile_block(block: &str, midi_enabled: bool, block_idx: usize) -> Result<Block, ScoreError> {
    let states = split_states(block)
        .into_iter()
        .enumerate()
        .map(|(state_idx, token)| compile_state(token, midi_enabled, block_idx, state_idx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Block { states })
}

fn compile_state(
    token: &str,
    midi_enabled: bool,
    block: usize,
    state: usize,
) -> Result<State, ScoreError> {
    let mut commands = Vec::new();

    for group in split_command_groups(token) {
        if group.is_empty() {
            continue;
        }

        if starts_with_bit(group) {
            for line in split_lines(group) {
                if line.is_empty() {
                    continue;
                }
                let (bits, descriptor) = split_row_midi(line);
                let bits = parse_bits(bits.trim(), block, state)?;
                let midi = if descriptor.is_empty() {
                    None
                } else if midi_enabled {
                    Some(bind_midi_descriptor(descriptor))
                } else {
                    debug!("MIDI disabled, ignoring descriptor '{descriptor}'");
                    None
                };
                commands.push(Command::PlayRow { bits, midi });
            }
        } else {
            for cmd in split_preproc_commands(group) {
                let cmd = cmd.trim();
                if !cmd.is_empty() {
                    commands.push(parse_setup_command(cmd, block, state)?);
                }
            }
        }
    }

    Ok(State { commands })
}

fn parse_setup_command(cmd: &str, block: usize, state: usize) -> Result<Command, ScoreError> {
    let (key, value) = split_assign(cmd)?;
    let invalid = || ScoreError::InvalidCommand {
        key: key.to_string(),
        block,
        state,
    };

    let channel = match Keyword::from_key(key).ok_or_else(invalid)? {
        Keyword::Tempo => {
            return Ok(Command::SetTempo {
                bpm: parse_bpm(cmd, value)?,
            })
        }
        Keyword::Red => ColorChannel::Red,
        Keyword::Green => ColorChannel::Green,
        Keyword::Blue => ColorChannel::Blue,
        Keyword::GridShape | Keyword::CanvasShape | Keyword::MidiEnable => return Err(invalid()),
    };

    Ok(Command::SetColorChannel {
        channel,
        value: parse_channel_value(cmd, value)?,
    })
}

fn parse_bits(bits: &str, block: usize, state: usize) -> Result<Vec<Light>, ScoreError> {
    bits.chars()
        .map(|ch| {
            Light::from_char(ch).ok_or(ScoreError::InvalidLightStatus {
                found: ch,
                block,
                state,
            })
        })
        .collect()
}

fn split_assign(cmd: &str) -> Result<(&str, &str), ScoreError> {
    cmd.split_once(ASSIGN)
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| ScoreError::malformed(cmd, format!("missing '{ASSIGN}'")))
}

fn parse_matrix(cmd: &str, value: &str) -> Result<(u32, u32), ScoreError> {
    let (a, b) = value
        .split_once(MATRIX)
        .ok_or_else(|| ScoreError::malformed(cmd, format!("expected INT{MATRIX}INT")))?;
    Ok((parse_positive(cmd, a)?, parse_positive(cmd, b)?))
}

fn parse_positive(cmd: &str, value: &str) -> Result<u32, ScoreError> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err(ScoreError::malformed(cmd, "value must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(ScoreError::malformed(cmd, e.to_string())),
    }
}

fn parse_bpm(cmd: &str, value: &str) -> Result<u32, ScoreError> {
    parse_positive(cmd, value)
}

fn parse_channel_value(cmd: &str, value: &str) -> Result<u8, ScoreError> {
    value
        .parse::<u8>()
        .map_err(|e| ScoreError::malformed(cmd, e.to_string()))
}

/// Truncate toward zero and keep the low byte; encoders mask further.
fn to_byte(value: f64) -> u8 {
    value.trunc() as i64 as u8
}
