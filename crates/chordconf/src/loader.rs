//! Config file discovery, loading, and environment variable overlay.

use crate::{ChordConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only returns files
/// that exist. A `cli_path` replaces the local `./chordmidi.toml`; callers
/// check that it exists before discovery.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/chordmidi/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordmidi/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
        }
        return files;
    }

    let local = PathBuf::from("chordmidi.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load a TOML file on top of `base`. Keys absent from the file keep their base value.
pub fn load_from_file(path: &Path, base: ChordConfig) -> Result<ChordConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path, base)
}

/// Parse config from a TOML string on top of `base`.
pub(crate) fn parse_toml(
    contents: &str,
    path: &Path,
    base: ChordConfig,
) -> Result<ChordConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config = base;
    let bad = |key: &str, why: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{}: {}", key, why),
    };

    if let Some(synth) = table.get("synth").and_then(|v| v.as_table()) {
        if let Some(v) = synth.get("tempo_bpm").and_then(|v| v.as_integer()) {
            config.synth.tempo_bpm =
                u32::try_from(v).map_err(|_| bad("synth.tempo_bpm", "out of range"))?;
        }
        if let Some(v) = synth.get("min_duration_secs") {
            config.synth.min_duration_secs = v
                .as_float()
                .or_else(|| v.as_integer().map(|i| i as f64))
                .ok_or_else(|| bad("synth.min_duration_secs", "expected a number"))?;
        }
        if let Some(v) = synth.get("ticks_per_beat").and_then(|v| v.as_integer()) {
            config.synth.ticks_per_beat = u16::try_from(v)
                .ok()
                .filter(|v| (1..=0x7FFF).contains(v))
                .ok_or_else(|| bad("synth.ticks_per_beat", "must be 1-32767"))?;
        }
        if let Some(v) = synth.get("velocity").and_then(|v| v.as_integer()) {
            config.synth.velocity = u8::try_from(v)
                .ok()
                .filter(|v| *v <= 127)
                .ok_or_else(|| bad("synth.velocity", "must be 0-127"))?;
        }
        if let Some(v) = synth.get("channel").and_then(|v| v.as_integer()) {
            config.synth.channel = u8::try_from(v)
                .ok()
                .filter(|v| *v <= 15)
                .ok_or_else(|| bad("synth.channel", "must be 0-15"))?;
        }
    }

    if let Some(output) = table.get("output").and_then(|v| v.as_table()) {
        if let Some(v) = output.get("dir").and_then(|v| v.as_str()) {
            config.output.dir = expand_path(v);
        }
        if let Some(v) = output.get("suffix").and_then(|v| v.as_str()) {
            config.output.suffix = v.to_string();
        }
        if let Some(v) = output.get("preview_limit").and_then(|v| v.as_integer()) {
            config.output.preview_limit =
                usize::try_from(v).map_err(|_| bad("output.preview_limit", "out of range"))?;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(config)
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ChordConfig, sources: &mut ConfigSources) {
    apply_overrides(config, sources, |key| env::var(key).ok());
}

/// Apply overrides from any key lookup. Unparseable values are ignored.
pub fn apply_overrides<F>(config: &mut ChordConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("CHORDMIDI_TEMPO") {
        if let Ok(bpm) = v.parse() {
            config.synth.tempo_bpm = bpm;
            sources.env_overrides.push("CHORDMIDI_TEMPO".to_string());
        }
    }
    if let Some(v) = lookup("CHORDMIDI_MIN_DURATION") {
        if let Ok(secs) = v.parse() {
            config.synth.min_duration_secs = secs;
            sources.env_overrides.push("CHORDMIDI_MIN_DURATION".to_string());
        }
    }
    if let Some(v) = lookup("CHORDMIDI_TICKS_PER_BEAT") {
        if let Ok(tpb) = v.parse::<u16>() {
            if (1..=0x7FFF).contains(&tpb) {
                config.synth.ticks_per_beat = tpb;
                sources.env_overrides.push("CHORDMIDI_TICKS_PER_BEAT".to_string());
            }
        }
    }
    if let Some(v) = lookup("CHORDMIDI_VELOCITY") {
        if let Ok(vel) = v.parse::<u8>() {
            if vel <= 127 {
                config.synth.velocity = vel;
                sources.env_overrides.push("CHORDMIDI_VELOCITY".to_string());
            }
        }
    }
    if let Some(v) = lookup("CHORDMIDI_OUTPUT_DIR") {
        config.output.dir = expand_path(&v);
        sources.env_overrides.push("CHORDMIDI_OUTPUT_DIR".to_string());
    }
    if let Some(v) = lookup("CHORDMIDI_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("CHORDMIDI_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
        return PathBuf::from(path);
    }

    if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        return match stripped.split_once('/') {
            Some((var_name, rest)) => env::var(var_name)
                .map(|value| PathBuf::from(value).join(rest))
                .unwrap_or_else(|_| PathBuf::from(path)),
            None => env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path)),
        };
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/test/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_path_unknown_var_kept() {
        let expanded = expand_path("$CHORDMIDI_SURELY_UNSET_VAR/out");
        assert_eq!(expanded, PathBuf::from("$CHORDMIDI_SURELY_UNSET_VAR/out"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files_with_override(None);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[synth]
tempo_bpm = 90
"#;
        let config = parse_toml(toml, Path::new("test.toml"), ChordConfig::default()).unwrap();
        assert_eq!(config.synth.tempo_bpm, 90);
        // Other values should be defaults
        assert_eq!(config.synth.min_duration_secs, 0.5);
        assert_eq!(config.output.suffix, "_chords");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[synth]
tempo_bpm = 100
min_duration_secs = 0.25
ticks_per_beat = 960
velocity = 90
channel = 2

[output]
dir = "/tmp/midi"
suffix = "-progression"
preview_limit = 5

[telemetry]
log_level = "debug"
"#;
        let config = parse_toml(toml, Path::new("test.toml"), ChordConfig::default()).unwrap();

        assert_eq!(config.synth.tempo_bpm, 100);
        assert_eq!(config.synth.min_duration_secs, 0.25);
        assert_eq!(config.synth.ticks_per_beat, 960);
        assert_eq!(config.synth.velocity, 90);
        assert_eq!(config.synth.channel, 2);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/midi"));
        assert_eq!(config.output.suffix, "-progression");
        assert_eq!(config.output.preview_limit, 5);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_integer_min_duration_accepted() {
        let toml = "[synth]\nmin_duration_secs = 1\n";
        let config = parse_toml(toml, Path::new("test.toml"), ChordConfig::default()).unwrap();
        assert_eq!(config.synth.min_duration_secs, 1.0);
    }

    #[test]
    fn test_later_file_overlays_earlier() {
        let first = parse_toml(
            "[synth]\ntempo_bpm = 90\nvelocity = 100\n",
            Path::new("a.toml"),
            ChordConfig::default(),
        )
        .unwrap();
        let second = parse_toml("[synth]\ntempo_bpm = 140\n", Path::new("b.toml"), first).unwrap();

        assert_eq!(second.synth.tempo_bpm, 140);
        assert_eq!(second.synth.velocity, 100);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for toml in [
            "[synth]\ntempo_bpm = -1\n",
            "[synth]\nvelocity = 128\n",
            "[synth]\nchannel = 16\n",
            "[synth]\nticks_per_beat = 70000\n",
            "[synth]\nmin_duration_secs = \"long\"\n",
        ] {
            let result = parse_toml(toml, Path::new("bad.toml"), ChordConfig::default());
            assert!(matches!(result, Err(ConfigError::Parse { .. })), "{}", toml);
        }
    }

    #[test]
    fn test_invalid_toml() {
        let result = parse_toml("[synth\n", Path::new("broken.toml"), ChordConfig::default());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ChordConfig::default();
        let mut sources = ConfigSources::default();
        let lookup = lookup_from(&[
            ("CHORDMIDI_TEMPO", "96"),
            ("CHORDMIDI_MIN_DURATION", "0.75"),
            ("CHORDMIDI_LOG_LEVEL", "warn"),
        ]);

        apply_overrides(&mut config, &mut sources, lookup);

        assert_eq!(config.synth.tempo_bpm, 96);
        assert_eq!(config.synth.min_duration_secs, 0.75);
        assert_eq!(config.telemetry.log_level, "warn");
        assert_eq!(sources.env_overrides.len(), 3);
    }

    #[test]
    fn test_ticks_per_beat_bounds() {
        for toml in ["[synth]\nticks_per_beat = 0\n", "[synth]\nticks_per_beat = 32768\n"] {
            let result = parse_toml(toml, Path::new("bad.toml"), ChordConfig::default());
            assert!(matches!(result, Err(ConfigError::Parse { .. })), "{}", toml);
        }

        let config = parse_toml(
            "[synth]\nticks_per_beat = 32767\n",
            Path::new("max.toml"),
            ChordConfig::default(),
        )
        .unwrap();
        assert_eq!(config.synth.ticks_per_beat, 0x7FFF);
    }

    #[test]
    fn test_env_ticks_per_beat_out_of_range_ignored() {
        for value in ["0", "32768"] {
            let mut config = ChordConfig::default();
            let mut sources = ConfigSources::default();
            apply_overrides(
                &mut config,
                &mut sources,
                lookup_from(&[("CHORDMIDI_TICKS_PER_BEAT", value)]),
            );
            assert_eq!(config.synth.ticks_per_beat, 480, "{}", value);
            assert!(sources.env_overrides.is_empty());
        }

        let mut config = ChordConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides(
            &mut config,
            &mut sources,
            lookup_from(&[("CHORDMIDI_TICKS_PER_BEAT", "32767")]),
        );
        assert_eq!(config.synth.ticks_per_beat, 0x7FFF);
    }

    #[test]
    fn test_env_override_garbage_ignored() {
        let mut config = ChordConfig::default();
        let mut sources = ConfigSources::default();
        let lookup = lookup_from(&[("CHORDMIDI_TEMPO", "fast"), ("CHORDMIDI_VELOCITY", "200")]);

        apply_overrides(&mut config, &mut sources, lookup);

        assert_eq!(config.synth.tempo_bpm, 120);
        assert_eq!(config.synth.velocity, 64);
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn test_rust_log_wins_over_config_level() {
        let mut config = ChordConfig::default();
        let mut sources = ConfigSources::default();
        let lookup = lookup_from(&[
            ("CHORDMIDI_LOG_LEVEL", "warn"),
            ("RUST_LOG", "chord_timeline=trace"),
        ]);

        apply_overrides(&mut config, &mut sources, lookup);
        assert_eq!(config.telemetry.log_level, "chord_timeline=trace");
    }
}
