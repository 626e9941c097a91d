//! Recognizer output loading.
//!
//! Two on-disk shapes are accepted:
//! - MIREX `.lab` text: `start end label` per line
//! - JSON: `[{"start": 0.0, "end": 1.0, "label": "C:maj"}, ...]` or
//!   `[[0.0, 1.0, "C:maj"], ...]`

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// One recognizer frame: a raw label over a wall-clock interval in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub start: f64,
    pub end: f64,
    pub label: String,
}

impl RawFrame {
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Lab,
    Json,
}

impl FrameFormat {
    /// `.json` files are JSON; anything else is treated as lab text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FrameFormat::Json,
            _ => FrameFormat::Lab,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFrame {
    Object { start: f64, end: f64, label: String },
    Tuple(f64, f64, String),
}

impl From<JsonFrame> for RawFrame {
    fn from(frame: JsonFrame) -> Self {
        match frame {
            JsonFrame::Object { start, end, label } => RawFrame { start, end, label },
            JsonFrame::Tuple(start, end, label) => RawFrame { start, end, label },
        }
    }
}

/// Read frames from a file, choosing the parser by extension.
pub fn load_frames(path: &Path) -> Result<Vec<RawFrame>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let frames = match FrameFormat::from_path(path) {
        FrameFormat::Json => parse_json(&contents)?,
        FrameFormat::Lab => parse_lab(&contents)?,
    };

    debug!(path = %path.display(), frames = frames.len(), "loaded recognizer frames");
    Ok(frames)
}

/// Parse MIREX lab text. Blank lines and `#` comments are skipped.
pub fn parse_lab(contents: &str) -> Result<Vec<RawFrame>> {
    let mut frames = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let start = parse_time(fields.next(), line_no, "start")?;
        let end = parse_time(fields.next(), line_no, "end")?;
        let label = fields.next().ok_or_else(|| Error::FrameParse {
            line: line_no,
            message: "missing label".to_string(),
        })?;
        if let Some(extra) = fields.next() {
            return Err(Error::FrameParse {
                line: line_no,
                message: format!("unexpected field '{}'", extra),
            });
        }

        let frame = RawFrame::new(start, end, label);
        validate(&frame, line_no)?;
        frames.push(frame);
    }

    Ok(frames)
}

/// Parse a JSON array of frames. Errors report the 1-based array index as the line.
pub fn parse_json(contents: &str) -> Result<Vec<RawFrame>> {
    let raw: Vec<JsonFrame> = serde_json::from_str(contents)?;
    let frames: Vec<RawFrame> = raw.into_iter().map(RawFrame::from).collect();

    for (idx, frame) in frames.iter().enumerate() {
        validate(frame, idx + 1)?;
    }

    Ok(frames)
}

fn parse_time(field: Option<&str>, line: usize, what: &str) -> Result<f64> {
    let field = field.ok_or_else(|| Error::FrameParse {
        line,
        message: format!("missing {} time", what),
    })?;
    field.parse::<f64>().map_err(|e| Error::FrameParse {
        line,
        message: format!("bad {} time '{}': {}", what, field, e),
    })
}

fn validate(frame: &RawFrame, line: usize) -> Result<()> {
    if !frame.start.is_finite() || !frame.end.is_finite() {
        return Err(Error::FrameParse {
            line,
            message: "times must be finite".to_string(),
        });
    }
    if frame.start < 0.0 {
        return Err(Error::FrameParse {
            line,
            message: format!("negative start time {}", frame.start),
        });
    }
    if frame.end <= frame.start {
        return Err(Error::FrameParse {
            line,
            message: format!("end {} is not after start {}", frame.end, frame.start),
        });
    }
    Ok(())
}
