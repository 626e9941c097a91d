//! Configuration loading for chordmidi.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chordmidi/config.toml` (system)
//! 2. `~/.config/chordmidi/config.toml` (user)
//! 3. `./chordmidi.toml` (local override), or the path given with `--config`
//! 4. Environment variables (`CHORDMIDI_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [synth]
//! tempo_bpm = 120
//! min_duration_secs = 0.5
//! ticks_per_beat = 480
//! velocity = 64
//! channel = 0
//!
//! [output]
//! dir = "~/midi"
//! suffix = "_chords"
//! preview_limit = 20
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{OutputConfig, SynthConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete chordmidi configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChordConfig {
    #[serde(default)]
    pub synth: SynthConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ChordConfig {
    /// Load configuration and report where values came from.
    ///
    /// An explicit `config_path` takes the place of `./chordmidi.toml` and
    /// must exist. System and user configs still load first.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(ConfigError::FileRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such config file"),
                });
            }
        }

        let mut sources = ConfigSources::default();
        let mut config = ChordConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            config = loader::load_from_file(&path, config)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# chordmidi configuration\n\n");

        output.push_str("[synth]\n");
        output.push_str(&format!("tempo_bpm = {}\n", self.synth.tempo_bpm));
        output.push_str(&format!(
            "min_duration_secs = {:?}\n",
            self.synth.min_duration_secs
        ));
        output.push_str(&format!("ticks_per_beat = {}\n", self.synth.ticks_per_beat));
        output.push_str(&format!("velocity = {}\n", self.synth.velocity));
        output.push_str(&format!("channel = {}\n", self.synth.channel));

        output.push_str("\n[output]\n");
        output.push_str(&format!("dir = \"{}\"\n", self.output.dir.display()));
        output.push_str(&format!("suffix = \"{}\"\n", self.output.suffix));
        output.push_str(&format!("preview_limit = {}\n", self.output.preview_limit));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
