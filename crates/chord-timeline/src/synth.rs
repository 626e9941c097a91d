//! Segment timeline to MIDI event synthesis.
//!
//! Converts wall-clock chord segments into a single-track event list with
//! delta timing. Every sounded chord is a root-position triad: all three
//! note-ons at the segment start, all three note-offs after the segment's
//! (floored) duration.

use tracing::{debug, trace};

use crate::merge::ChordSegment;
use crate::triad::notes_for_name;
use crate::{Error, Result};

/// Default resolution, ticks per quarter note.
pub const TICKS_PER_BEAT: u16 = 480;

/// Largest delta a MIDI variable-length quantity can carry (28 bits).
const MAX_DELTA: u64 = 0x0FFF_FFFF;

/// Tempo range whose microseconds-per-beat fits the 24-bit tempo field.
const MIN_TEMPO_BPM: u32 = 4;
const MAX_TEMPO_BPM: u32 = 60_000_000;

/// Metrical division is 15 bits; the top bit of the header word selects SMPTE timing.
pub const MAX_TICKS_PER_BEAT: u16 = 0x7FFF;

/// Parameters for timeline synthesis.
#[derive(Debug, Clone)]
pub struct SynthParams {
    pub tempo_bpm: u32,
    /// Chords shorter than this are stretched to it
    pub min_duration_secs: f64,
    pub ticks_per_beat: u16,
    /// MIDI velocity for every note (0-127)
    pub velocity: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            tempo_bpm: 120,
            min_duration_secs: 0.5,
            ticks_per_beat: TICKS_PER_BEAT,
            velocity: 64,
            channel: 0,
        }
    }
}

impl SynthParams {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&self.tempo_bpm) {
            return Err(Error::InvalidTempo {
                bpm: self.tempo_bpm,
            });
        }
        if !(1..=MAX_TICKS_PER_BEAT).contains(&self.ticks_per_beat) {
            return Err(Error::InvalidTicksPerBeat {
                ticks_per_beat: self.ticks_per_beat,
            });
        }
        if !self.min_duration_secs.is_finite() || self.min_duration_secs < 0.0 {
            return Err(Error::InvalidMinDuration {
                seconds: self.min_duration_secs,
            });
        }
        Ok(())
    }

    /// Microseconds per quarter note, rounded half-to-even.
    pub fn microseconds_per_beat(&self) -> u32 {
        (60_000_000.0 / self.tempo_bpm as f64).round_ties_even() as u32
    }

    pub fn ticks(&self, seconds: f64) -> u64 {
        ticks(seconds, self.tempo_bpm, self.ticks_per_beat)
    }
}

/// Convert seconds to ticks at a fixed tempo, truncating toward zero.
pub fn ticks(seconds: f64, tempo_bpm: u32, ticks_per_beat: u16) -> u64 {
    let beats = seconds * tempo_bpm as f64 / 60.0;
    (beats * ticks_per_beat as f64) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEventKind {
    Tempo { microseconds_per_beat: u32 },
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    NoteOff { channel: u8, pitch: u8, velocity: u8 },
}

/// One track event; `delta_ticks` is measured from the previous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub delta_ticks: u32,
    pub kind: TickEventKind,
}

impl TickEvent {
    pub fn is_note_on(&self) -> bool {
        matches!(self.kind, TickEventKind::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self.kind, TickEventKind::NoteOff { .. })
    }
}

/// Build the event list for a segment timeline.
///
/// The running cursor tracks absolute ticks. A segment that starts before
/// the cursor (overlap or out-of-order input) starts immediately instead
/// of moving backwards. Segments without a triad are skipped.
pub fn synthesize(segments: &[ChordSegment], params: &SynthParams) -> Result<Vec<TickEvent>> {
    params.validate()?;

    let channel = params.channel & 0x0F;
    let velocity = params.velocity & 0x7F;

    let mut events = Vec::with_capacity(1 + segments.len() * 6);
    events.push(TickEvent {
        delta_ticks: 0,
        kind: TickEventKind::Tempo {
            microseconds_per_beat: params.microseconds_per_beat(),
        },
    });

    let mut cursor: u64 = 0;
    let mut skipped = 0usize;

    for segment in segments {
        let Some(notes) = notes_for_name(&segment.label) else {
            skipped += 1;
            debug!(label = %segment.label, start = segment.start, "no triad, skipping segment");
            continue;
        };

        let seg_start = params.ticks(segment.start);
        let delta = seg_start.saturating_sub(cursor);

        for (i, &pitch) in notes.iter().enumerate() {
            events.push(TickEvent {
                delta_ticks: if i == 0 { to_delta(delta)? } else { 0 },
                kind: TickEventKind::NoteOn {
                    channel,
                    pitch,
                    velocity,
                },
            });
        }

        // Duration counts from the nominal start, not from when the previous chord stopped.
        cursor = seg_start;

        let effective = segment.duration().max(params.min_duration_secs);
        let duration = params.ticks(effective).max(1);

        for (i, &pitch) in notes.iter().enumerate() {
            events.push(TickEvent {
                delta_ticks: if i == 0 { to_delta(duration)? } else { 0 },
                kind: TickEventKind::NoteOff {
                    channel,
                    pitch,
                    velocity,
                },
            });
        }

        cursor += duration;
        trace!(label = %segment.label, seg_start, duration, cursor, "chord placed");
    }

    debug!(
        segments = segments.len(),
        skipped,
        events = events.len(),
        end_tick = cursor,
        "synthesized timeline"
    );

    Ok(events)
}

fn to_delta(ticks: u64) -> Result<u32> {
    if ticks > MAX_DELTA {
        return Err(Error::DeltaOverflow { ticks });
    }
    Ok(ticks as u32)
}
