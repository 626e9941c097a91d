use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chord_timeline::{load_frames, merge, output_file_name, preview, render, SynthParams};
use chordconf::{ChordConfig, ConfigSources};
use tracing::info;

pub struct ConvertArgs {
    pub frames: PathBuf,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub tempo: Option<u32>,
    pub min_duration: Option<f64>,
}

/// Build synthesis parameters from config, with CLI flags taking precedence.
fn synth_params(config: &ChordConfig, tempo: Option<u32>, min_duration: Option<f64>) -> SynthParams {
    SynthParams {
        tempo_bpm: tempo.unwrap_or(config.synth.tempo_bpm),
        min_duration_secs: min_duration.unwrap_or(config.synth.min_duration_secs),
        ticks_per_beat: config.synth.ticks_per_beat,
        velocity: config.synth.velocity,
        channel: config.synth.channel,
    }
}

fn output_path(config: &ChordConfig, args: &ConvertArgs) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }

    let stem = args.name.clone().unwrap_or_else(|| {
        args.frames
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    config
        .output
        .dir
        .join(output_file_name(&stem, &config.output.suffix))
}

pub fn convert(config: &ChordConfig, args: ConvertArgs) -> Result<ExitCode> {
    let frames = load_frames(&args.frames)
        .with_context(|| format!("loading chord frames from {}", args.frames.display()))?;

    let params = synth_params(config, args.tempo, args.min_duration);
    let rendering = render(&frames, &params).context("rendering chord timeline")?;

    println!("Detected {} chord segments", rendering.segments.len());

    if rendering.is_silent() {
        eprintln!("Warning: No chords detected in the input");
        return Ok(ExitCode::FAILURE);
    }

    println!("\nDetected chord progression:");
    print!("{}", preview(&rendering.segments, config.output.preview_limit));

    let path = output_path(config, &args);
    std::fs::write(&path, &rendering.midi)
        .with_context(|| format!("writing MIDI file {}", path.display()))?;

    info!(path = %path.display(), bytes = rendering.midi.len(), "MIDI file saved");
    println!("\nSuccess! MIDI file created: {}", path.display());
    println!("Total chords detected: {}", rendering.segments.len());

    Ok(ExitCode::SUCCESS)
}

pub fn segments(
    config: &ChordConfig,
    frames_path: &Path,
    limit: Option<usize>,
    json: bool,
) -> Result<ExitCode> {
    let frames = load_frames(frames_path)
        .with_context(|| format!("loading chord frames from {}", frames_path.display()))?;
    let segments = merge(&frames).context("merging chord frames")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
    } else {
        let limit = limit.unwrap_or(config.output.preview_limit);
        print!("{}", preview(&segments, limit));
    }

    // Same exit status as `convert` when nothing would be played.
    if segments.is_empty() {
        eprintln!("Warning: No chords detected in the input");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

pub fn show_config(config: &ChordConfig, sources: &ConfigSources) {
    if sources.files.is_empty() {
        println!("# no config files found, using defaults");
    }
    for file in &sources.files {
        println!("# loaded: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# env override: {}", var);
    }
    println!("{}", config.to_toml());
}
