//! Config sections: synthesis, output, telemetry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MIDI synthesis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Tempo written to the MIDI file and used for tick conversion.
    /// Default: 120
    #[serde(default = "SynthConfig::default_tempo_bpm")]
    pub tempo_bpm: u32,

    /// Shortest audible chord, in seconds.
    /// Default: 0.5
    #[serde(default = "SynthConfig::default_min_duration_secs")]
    pub min_duration_secs: f64,

    /// Default: 480
    #[serde(default = "SynthConfig::default_ticks_per_beat")]
    pub ticks_per_beat: u16,

    /// Default: 64
    #[serde(default = "SynthConfig::default_velocity")]
    pub velocity: u8,

    /// Default: 0
    #[serde(default)]
    pub channel: u8,
}

impl SynthConfig {
    fn default_tempo_bpm() -> u32 {
        120
    }

    fn default_min_duration_secs() -> f64 {
        0.5
    }

    fn default_ticks_per_beat() -> u16 {
        480
    }

    fn default_velocity() -> u8 {
        64
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: Self::default_tempo_bpm(),
            min_duration_secs: Self::default_min_duration_secs(),
            ticks_per_beat: Self::default_ticks_per_beat(),
            velocity: Self::default_velocity(),
            channel: 0,
        }
    }
}

/// Where and how output files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for derived output names (explicit `-o` paths ignore it).
    /// Default: .
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,

    /// Appended to the derived file stem.
    /// Default: _chords
    #[serde(default = "OutputConfig::default_suffix")]
    pub suffix: String,

    /// Segments shown in the timeline preview.
    /// Default: 20
    #[serde(default = "OutputConfig::default_preview_limit")]
    pub preview_limit: usize,
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_suffix() -> String {
        "_chords".to_string()
    }

    fn default_preview_limit() -> usize {
        20
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            suffix: Self::default_suffix(),
            preview_limit: Self::default_preview_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
