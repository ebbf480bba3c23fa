//! shiftwave CLI: pitch-shift a looped WAV file, to disk or to the speakers.
//!
//! Usage:
//!   sw-cli path/to/input.wav
//!   sw-cli path/to/input.wav --wav output.wav --transpose -7
//!   sw-cli path/to/input.wav --play

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sw_master::{Controller, DemoCurve, FixedPitch, FormatError, PitchCurve};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

/// Largest rate whose byte rate fits the 32-bit header field.
const MAX_RATE: i64 = (u32::MAX / 4) as i64;
/// Largest length whose data and RIFF sizes fit the 32-bit header fields.
const MAX_SAMPLES: i64 = ((u32::MAX - 36) / 4) as i64;

#[derive(Parser, Debug)]
#[command(name = "sw-cli")]
#[command(about = "Two-mode windowed-sinc pitch shifter")]
#[command(version)]
struct Args {
    /// Source WAV file; its first channel is looped
    #[arg(default_value = "1234.wav")]
    input: PathBuf,

    /// Render to this WAV file
    #[arg(long, default_value = "demo.wav", conflicts_with = "play")]
    wav: PathBuf,

    /// Stream to the default audio device instead of writing a file
    #[arg(long)]
    play: bool,

    /// Sample rate written to the output header
    #[arg(
        long,
        default_value_t = 44100,
        env = "SHIFTWAVE_RATE",
        value_parser = clap::value_parser!(u32).range(1..=MAX_RATE)
    )]
    rate: u32,

    /// Output length in samples
    #[arg(long, default_value_t = 0x200000, value_parser = clap::value_parser!(u32).range(..=MAX_SAMPLES))]
    samples: u32,

    /// Hold a fixed transposition in semitones instead of the demo curve
    #[arg(long, allow_hyphen_values = true, conflicts_with = "ratio")]
    transpose: Option<f32>,

    /// Hold a fixed input/output ratio instead of the demo curve
    #[arg(long)]
    ratio: Option<f32>,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn curve(&self) -> Box<dyn PitchCurve + Send> {
        match (self.ratio, self.transpose) {
            (Some(ratio), _) => Box::new(FixedPitch::ratio(ratio)),
            (None, Some(semitones)) => Box::new(FixedPitch::semitones(semitones)),
            (None, None) => Box::new(DemoCurve::new(self.samples as usize)),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load failures exit with the magnitude of their format code.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<FormatError>())
        .map_or(1, |e| e.code().unsigned_abs() as u8)
}

fn run(args: &Args) -> Result<()> {
    let data = std::fs::read(&args.input)
        .map_err(FormatError::from)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut ctrl = Controller::from_wav_bytes(&data)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    println!("Source:   {}", args.input.display());
    println!("Samples:  {}", ctrl.source_len());
    println!("Rate:     {} Hz", ctrl.source_rate());
    println!();

    if args.play {
        play_audio(&mut ctrl, args);
        Ok(())
    } else {
        render_to_wav(&ctrl, args, &args.wav)
    }
}

fn play_audio(ctrl: &mut Controller, args: &Args) {
    ctrl.play(args.curve(), args.samples as usize);
    println!("Playing...");

    while ctrl.is_playing() {
        if let Some(pos) = ctrl.position() {
            print!("\rSample: {:>8} / {}", pos, args.samples);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    println!("\rDone.                          ");
}

fn render_to_wav(ctrl: &Controller, args: &Args, path: &Path) -> Result<()> {
    println!("saving output to file \"{}\"", path.display());

    let wav = ctrl
        .render_to_wav(args.curve(), args.samples as usize, args.rate)
        .context("failed to encode output")?;
    std::fs::write(path, &wav).with_context(|| format!("failed to write {}", path.display()))?;

    info!(bytes = wav.len(), rate = args.rate, "wrote output");
    Ok(())
}
