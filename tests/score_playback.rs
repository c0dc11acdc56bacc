//! Full pipeline integration tests: score text → compile → session → recorded output.
//!
//! A recording clock, surface and MIDI sink stand in for the timer, the
//! pixel surface and the MIDI transport.

use std::collections::BTreeMap;
use std::io;

use qust::clock::{Clock, TickSourceId};
use qust::engine::{Repeat, TickOutcome};
use qust::midi::{MidiError, MidiOut, MidiSink};
use qust::render::RenderSurface;
use qust::score::{ColorChannel, Command, Compiler, Rgb};
use qust::session::Session;

#[derive(Debug, Default)]
struct RecordingSink {
    messages: Vec<[u8; 3]>,
}

impl MidiSink for RecordingSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.messages.push([bytes[0], bytes[1], bytes[2]]);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingClock {
    intervals: BTreeMap<TickSourceId, Vec<u64>>,
    cancels: Vec<TickSourceId>,
}

impl Clock for RecordingClock {
    fn schedule(&mut self, source: TickSourceId, interval_ms: u64) {
        self.intervals.entry(source).or_default().push(interval_ms);
    }

    fn cancel(&mut self, source: TickSourceId) {
        self.cancels.push(source);
    }
}

#[derive(Debug, Default)]
struct FrameSurface {
    cells: BTreeMap<usize, Rgb>,
    frames: Vec<BTreeMap<usize, Rgb>>,
}

impl RenderSurface for FrameSurface {
    fn fill_cell(&mut self, cell: usize, color: Rgb) {
        self.cells.insert(cell, color);
    }

    fn present(&mut self) -> io::Result<()> {
        self.frames.push(self.cells.clone());
        Ok(())
    }
}

const RED: Rgb = Rgb::new(255, 0, 0);
const FIRST: TickSourceId = TickSourceId(1);

fn session(src: &str, repeat: Repeat) -> Session<RecordingSink> {
    let score = Compiler::compile(src).expect("compile failed");
    Session::from_score(&score, repeat, |_| {
        Ok(Some(MidiOut::new(RecordingSink::default())))
    })
    .expect("session failed")
}

/// Tick `source` until it completes, presenting after each tick.
fn run_to_end(
    session: &mut Session<RecordingSink>,
    source: TickSourceId,
    clock: &mut RecordingClock,
    surface: &mut FrameSurface,
) -> usize {
    let mut advanced = 0;
    loop {
        match session.tick(source, clock, surface).expect("tick failed") {
            TickOutcome::Advanced(_) => advanced += 1,
            TickOutcome::Completed => return advanced,
            TickOutcome::Idle => panic!("ticked after completion"),
        }
        surface.present().unwrap();
    }
}

#[test]
fn red_two_cell_grid() {
    let mut session = session("R:255&G:0&B:0&S:2x1&W:100x50\n>\n110*101*", Repeat::ONCE);
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();
    session.start(&mut clock, &mut surface);

    let advanced = run_to_end(&mut session, FIRST, &mut clock, &mut surface);
    assert_eq!(advanced, 2);
    assert_eq!(surface.frames[0][&0], RED);
    assert_eq!(surface.frames[0][&1], RED);
    assert_eq!(surface.frames[1][&0], RED);
    assert_eq!(surface.frames[1][&1], Rgb::BLACK);
    assert_eq!(clock.cancels, vec![FIRST]);
}

#[test]
fn midi_row_binds_and_underruns() {
    let mut session = session("S:3x1&R:10&MD>111|60&100&1*000*", Repeat::ONCE);
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();

    let TickOutcome::Advanced(report) = session.tick(FIRST, &mut clock, &mut surface).unwrap()
    else {
        panic!("expected an advanced tick");
    };
    assert_eq!(report.underruns.len(), 2);
    assert_eq!(surface.cells[&2], Rgb::new(10, 0, 0));

    session.tick(FIRST, &mut clock, &mut surface).unwrap();
    let sinks = session.close().unwrap();
    // Only the bound cell produced a note, and only it is released.
    assert_eq!(sinks[0].messages, vec![[0x90, 60, 100], [0x80, 60, 0]]);
}

#[test]
fn looping_block_runs_repeat_times_states() {
    let mut session = session("S:2x1>10*01*11*00*", Repeat::Times(3));
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();
    session.start(&mut clock, &mut surface);
    assert_eq!(run_to_end(&mut session, FIRST, &mut clock, &mut surface), 12);
    assert!(session.is_done());
    assert_eq!(clock.cancels, vec![FIRST]);
}

#[test]
fn notes_carry_across_loop_boundary() {
    // The final state leaves the note on; the next pass turns it off.
    let mut session = session("S:1x1&MD>0*1|60&100&1*", Repeat::Times(2));
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();
    run_to_end(&mut session, FIRST, &mut clock, &mut surface);
    let sinks = session.close().unwrap();
    assert_eq!(
        sinks[0].messages,
        vec![[0x90, 60, 100], [0x80, 60, 0], [0x90, 60, 100], [0x80, 60, 0]]
    );
}

#[test]
fn tempo_changes_take_effect_on_following_tick() {
    let mut session = session("S:1x1&BPM:120>1*BPM:120;0*BPM:60;1*0*", Repeat::ONCE);
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();
    session.start(&mut clock, &mut surface);
    run_to_end(&mut session, FIRST, &mut clock, &mut surface);
    assert_eq!(clock.intervals[&FIRST], vec![500, 500, 1000]);
}

#[test]
fn independent_engines_share_no_state() {
    let mut session = session("S:1x1&MD>G:200;1|60&100&1*>0*", Repeat::ONCE);
    let mut clock = RecordingClock::default();
    let mut surface = FrameSurface::default();
    let second = TickSourceId(2);

    session.tick(FIRST, &mut clock, &mut surface).unwrap();
    session.tick(second, &mut clock, &mut surface).unwrap();

    assert_eq!(session.engine(FIRST).unwrap().notes().active_count(), 1);
    assert_eq!(session.engine(second).unwrap().notes().active_count(), 0);
    assert_eq!(session.engine(second).unwrap().color(), Rgb::BLACK);
}

#[test]
fn first_state_backfill_is_visible_in_program() {
    let score = Compiler::compile("S:1x1&B:40>R:5;1*1*").unwrap();
    let first = &score.program.blocks[0].states[0];
    for (channel, value) in [
        (ColorChannel::Red, 5),
        (ColorChannel::Green, 0),
        (ColorChannel::Blue, 40),
    ] {
        assert!(first
            .commands
            .contains(&Command::SetColorChannel { channel, value }));
    }
}

#[test]
fn compile_errors_prevent_playback() {
    assert!(Compiler::compile("S:1x1>1*>Z:1;1*").is_err());
    assert!(Compiler::compile("S:1x1>1*12*").is_err());
    assert!(Compiler::compile("Q:1&S:1x1>1*").is_err());
}
