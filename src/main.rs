//! qust: plays a light-grid score in the terminal, optionally driving MIDI.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{info, warn};

use qust::clock::IntervalClock;
use qust::config::QustConfig;
use qust::engine::{Repeat, TickOutcome};
use qust::midi::{MidiOut, MidiPort};
use qust::render::{CellLayout, CellSizing, RenderSurface, TerminalSurface};
use qust::score::Compiler;
use qust::session::Session;

/// Longest sleep between checks of the stop flag.
const POLL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "qust", version, about)]
struct Cli {
    /// Score file to play.
    #[arg(required_unless_present = "list_midi")]
    score: Option<PathBuf>,

    /// Play every block this many times.
    #[arg(short, long, default_value_t = 1, conflicts_with = "forever")]
    repeat: u32,

    /// Loop every block until interrupted.
    #[arg(long)]
    forever: bool,

    /// MIDI output device (alias or substring of a port name).
    #[arg(short, long)]
    midi: Option<String>,

    /// List MIDI output devices and exit.
    #[arg(long)]
    list_midi: bool,

    /// How the canvas is divided into cells.
    #[arg(long, value_enum)]
    sizing: Option<CellSizing>,

    /// Print the compiled score as YAML and exit.
    #[arg(long)]
    dump: bool,

    /// Config file (default: ~/.qust/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("qust: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => QustConfig::load_from(path)?,
        None => QustConfig::load().unwrap_or_default(),
    };

    if cli.list_midi {
        for name in MidiPort::list_devices(&config.midi.client_name) {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(path) = cli.score else {
        return Err("no score given".into());
    };
    let score = Compiler::load(&path)?;

    if cli.dump {
        print!("{}", serde_yaml::to_string(&score)?);
        return Ok(());
    }

    let mut layout_config = config.layout.clone();
    if let Some(sizing) = cli.sizing {
        layout_config.sizing = sizing;
    }
    let layout = CellLayout::new(&score.config, &layout_config)?;

    let repeat = if cli.forever {
        Repeat::Forever
    } else {
        Repeat::Times(cli.repeat)
    };

    let midi_config = &config.midi;
    let device = cli.midi.clone().or_else(|| midi_config.device.clone());
    let mut session = Session::from_score(&score, repeat, |id| {
        let Some(device) = device.as_deref() else {
            warn!("{id}: score enables MIDI but no device is configured");
            return Ok(None);
        };
        let client = format!("{}-{}", midi_config.client_name, id.0);
        let port = MidiPort::open(&client, midi_config.resolve_device(device))?;
        Ok(Some(MidiOut::new(port)))
    })?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    let mut clock = IntervalClock::new();
    let mut surface = TerminalSurface::stdout(layout);
    surface.begin()?;
    let played = play(&mut session, &mut clock, &mut surface, &stop);
    surface.end()?;

    // Close before reporting playback errors so no note is left sounding.
    let closed = session.close();
    played?;
    for port in closed? {
        port.close();
    }
    Ok(())
}

fn play(
    session: &mut Session<MidiPort>,
    clock: &mut IntervalClock,
    surface: &mut TerminalSurface<std::io::Stdout>,
    stop: &AtomicBool,
) -> Result<(), Box<dyn Error>> {
    session.start(clock, surface);
    surface.present()?;

    while !session.is_done() {
        if stop.load(Ordering::SeqCst) {
            info!("interrupted");
            break;
        }
        let Some(deadline) = clock.next_deadline() else {
            break;
        };
        let now = Instant::now();
        if deadline > now {
            thread::sleep((deadline - now).min(POLL));
            continue;
        }

        for id in clock.due(now) {
            if session.tick(id, clock, surface)? == TickOutcome::Completed {
                info!("{id} finished");
            }
        }
        surface.present()?;
    }
    Ok(())
}
