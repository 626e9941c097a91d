//! chordmidi - chord recognizer output to MIDI
//!
//! Subcommands:
//! - `chordmidi convert <frames>` - Merge frames and write a MIDI file
//! - `chordmidi segments <frames>` - Print the merged chord timeline
//! - `chordmidi config` - Show the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chordconf::ChordConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "chordmidi")]
#[command(about = "Turn recognized chord labels into a chord timeline and a MIDI file")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./chordmidi.toml
    #[arg(long, global = true, env = "CHORDMIDI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge recognizer frames and write a MIDI file
    ///
    /// Exits with status 1 and writes nothing when no playable chord is found.
    Convert {
        /// Recognizer output (.lab text or .json)
        frames: PathBuf,

        /// Output MIDI file path (default: derived from --name or the input file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Song name used to derive the output file name
        #[arg(short, long)]
        name: Option<String>,

        /// Tempo for the MIDI file in BPM
        #[arg(long)]
        tempo: Option<u32>,

        /// Minimum duration for each chord in seconds
        #[arg(long)]
        min_duration: Option<f64>,
    },

    /// Print the merged chord timeline
    ///
    /// Exits with status 1 when the input holds only no-chord frames.
    Segments {
        /// Recognizer output (.lab text or .json)
        frames: PathBuf,

        /// Maximum segments to show (default: from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print all segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where it came from
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, sources) = ChordConfig::load_with_sources_from(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            frames,
            output,
            name,
            tempo,
            min_duration,
        } => commands::convert(
            &config,
            commands::ConvertArgs {
                frames,
                output,
                name,
                tempo,
                min_duration,
            },
        ),
        Commands::Segments {
            frames,
            limit,
            json,
        } => commands::segments(&config, &frames, limit, json),
        Commands::Config => {
            commands::show_config(&config, &sources);
            Ok(ExitCode::SUCCESS)
        }
    }
}
