//! Chord timeline extraction and MIDI synthesis.
//!
//! Turns a recognizer's frame-level chord stream into a deduplicated
//! segment timeline, then renders that timeline as a single-track
//! Standard MIDI File.
//!
//! # Example
//!
//! ```
//! use chord_timeline::{merge, render, RawFrame, SynthParams};
//!
//! let frames = vec![
//!     RawFrame::new(0.0, 1.0, "C:maj"),
//!     RawFrame::new(1.0, 2.0, "C:maj"),
//!     RawFrame::new(2.0, 3.0, "N"),
//!     RawFrame::new(3.0, 4.0, "A:min"),
//! ];
//!
//! let segments = merge(&frames).unwrap();
//! assert_eq!(segments.len(), 2);
//!
//! let rendering = render(&frames, &SynthParams::default()).unwrap();
//! assert_eq!(&rendering.midi[0..4], b"MThd");
//! ```

pub mod frames;
pub mod label;
pub mod merge;
pub mod midi_writer;
pub mod preview;
pub mod synth;
pub mod triad;

pub use frames::{load_frames, parse_json, parse_lab, FrameFormat, RawFrame};
pub use label::{normalize, normalize_detailed, CanonicalLabel, Normalized, NO_CHORD};
pub use merge::{merge, ChordSegment};
pub use midi_writer::to_smf;
pub use preview::{output_file_name, preview};
pub use synth::{
    synthesize, ticks, SynthParams, TickEvent, TickEventKind, MAX_TICKS_PER_BEAT, TICKS_PER_BEAT,
};
pub use triad::{notes_for, notes_for_name, NoteTriad};

use tracing::{info, warn};

/// Errors from chord timeline operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no chord frames to merge")]
    EmptyInput,

    #[error("tempo must be between 4 and 60000000 BPM, got {bpm}")]
    InvalidTempo { bpm: u32 },

    #[error("ticks per beat must be between 1 and 32767, got {ticks_per_beat}")]
    InvalidTicksPerBeat { ticks_per_beat: u16 },

    #[error("minimum duration must be a finite, non-negative number of seconds, got {seconds}")]
    InvalidMinDuration { seconds: f64 },

    #[error("delta of {ticks} ticks does not fit a MIDI variable-length quantity")]
    DeltaOverflow { ticks: u64 },

    #[error("frame parse error at line {line}: {message}")]
    FrameParse { line: usize, message: String },

    #[error("frame JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything produced by one pass from frames to MIDI bytes.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub segments: Vec<ChordSegment>,
    pub events: Vec<TickEvent>,
    pub midi: Vec<u8>,
}

impl Rendering {
    /// True when the input held nothing playable (only no-chord frames,
    /// or only labels without a triad).
    pub fn is_silent(&self) -> bool {
        !self.events.iter().any(|e| e.is_note_on())
    }
}

/// Merge frames, synthesize the event list, and serialize it.
pub fn render(frames: &[RawFrame], params: &SynthParams) -> Result<Rendering> {
    let segments = merge(frames)?;
    let events = synthesize(&segments, params)?;
    let midi = to_smf(&events, params.ticks_per_beat);

    let rendering = Rendering {
        segments,
        events,
        midi,
    };

    if rendering.is_silent() {
        warn!(frames = frames.len(), "no playable chords in input");
    } else {
        info!(
            segments = rendering.segments.len(),
            events = rendering.events.len(),
            bytes = rendering.midi.len(),
            "rendered chord timeline"
        );
    }

    Ok(rendering)
}
