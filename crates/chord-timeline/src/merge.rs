use serde::Serialize;
use tracing::{debug, warn};

use crate::frames::RawFrame;
use crate::label::{normalize_detailed, CanonicalLabel};
use crate::{Error, Result};

/// A maximal run of frames sharing one playable label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordSegment {
    pub start: f64,
    pub end: f64,
    /// Canonical chord name; never the no-chord sentinel
    pub label: String,
}

impl ChordSegment {
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Collapse a frame stream into chord segments.
///
/// Consecutive frames with the same canonical label become one segment
/// ending at the last frame's end. A no-chord frame closes the open run
/// and is itself dropped. Frames only need to be ordered; gaps between
/// same-label frames are absorbed into the segment.
///
/// Returns [`Error::EmptyInput`] for an empty slice. An input made only
/// of no-chord frames yields `Ok(vec![])`.
pub fn merge(frames: &[RawFrame]) -> Result<Vec<ChordSegment>> {
    if frames.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut segments = Vec::new();
    let mut open: Option<ChordSegment> = None;
    let mut collapsed = 0usize;

    for frame in frames {
        let normalized = normalize_detailed(&frame.label);
        if let Some(quality) = &normalized.collapsed_quality {
            collapsed += 1;
            debug!(raw = %frame.label, quality = %quality, "quality collapsed to root");
        }

        match normalized.label {
            CanonicalLabel::NoChord => {
                if let Some(run) = open.take() {
                    segments.push(run);
                }
            }
            CanonicalLabel::Chord(name) => {
                if let Some(run) = open.as_mut() {
                    if run.label == name {
                        run.end = frame.end;
                        continue;
                    }
                }
                if let Some(run) = open.replace(ChordSegment::new(frame.start, frame.end, name)) {
                    segments.push(run);
                }
            }
        }
    }

    if let Some(run) = open {
        segments.push(run);
    }

    debug!(
        frames = frames.len(),
        segments = segments.len(),
        collapsed,
        "merged chord frames"
    );

    if segments.is_empty() {
        warn!(frames = frames.len(), "only no-chord frames found");
    }

    Ok(segments)
}
