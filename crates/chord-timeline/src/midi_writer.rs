use crate::synth::{TickEvent, TickEventKind};

/// Write a synthesized event list to Standard MIDI File format 0 bytes.
///
/// One MTrk chunk holding the events in order, followed by end-of-track.
/// Deltas are written as given; the synthesizer already bounds them to 28 bits.
/// `ticks_per_beat` must be in `1..=MAX_TICKS_PER_BEAT`, as `SynthParams::validate` checks.
pub fn to_smf(events: &[TickEvent], ticks_per_beat: u16) -> Vec<u8> {
    let mut track_data = Vec::new();

    for event in events {
        write_vlq(&mut track_data, event.delta_ticks);
        match event.kind {
            TickEventKind::Tempo {
                microseconds_per_beat: usec,
            } => {
                track_data.extend_from_slice(&[
                    0xFF,
                    0x51,
                    0x03,
                    (usec >> 16) as u8,
                    (usec >> 8) as u8,
                    usec as u8,
                ]);
            }
            TickEventKind::NoteOn {
                channel,
                pitch,
                velocity,
            } => {
                track_data.extend_from_slice(&[0x90 | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F]);
            }
            TickEventKind::NoteOff {
                channel,
                pitch,
                velocity,
            } => {
                track_data.extend_from_slice(&[0x80 | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F]);
            }
        }
    }

    // End of track
    write_vlq(&mut track_data, 0);
    track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    build_midi_file(ticks_per_beat, &track_data)
}

/// Assemble the MThd header and the single MTrk chunk.
fn build_midi_file(ppq: u16, track_data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(22 + track_data.len());

    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes()); // format 0
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&ppq.to_be_bytes());

    buf.extend_from_slice(b"MTrk");
    buf.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
    buf.extend_from_slice(track_data);

    buf
}

/// Write a variable-length quantity to a byte buffer.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut len = 0;

    loop {
        bytes[len] = (value & 0x7F) as u8;
        if len > 0 {
            bytes[len] |= 0x80;
        }
        len += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }

    bytes[..len].reverse();
    buf.extend_from_slice(&bytes[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ChordSegment;
    use crate::synth::{synthesize, SynthParams};
    use midly::num::{u15, u24};
    use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

    fn progression() -> Vec<TickEvent> {
        let segments = vec![
            ChordSegment::new(0.0, 1.0, "C"),
            ChordSegment::new(1.0, 2.0, "Am"),
            ChordSegment::new(2.5, 2.6, "F"),
        ];
        synthesize(&segments, &SynthParams::default()).unwrap()
    }

    #[test]
    fn header_is_format_0_single_track() {
        let bytes = to_smf(&progression(), 480);
        let smf = Smf::parse(&bytes).expect("Generated MIDI should be valid");

        assert_eq!(smf.header.format, midly::Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(480)));
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn events_survive_parsing() {
        let events = progression();
        let bytes = to_smf(&events, 480);
        let smf = Smf::parse(&bytes).unwrap();
        let track = &smf.tracks[0];

        // Synthesized events plus end-of-track
        assert_eq!(track.len(), events.len() + 1);

        assert_eq!(
            track[0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)))
        );
        assert_eq!(track.last().unwrap().kind, TrackEventKind::Meta(MetaMessage::EndOfTrack));

        for (ours, theirs) in events.iter().zip(track.iter()) {
            assert_eq!(theirs.delta.as_int(), ours.delta_ticks);
        }

        let mut note_ons = Vec::new();
        for event in track.iter() {
            if let TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            } = event.kind
            {
                assert_eq!(channel.as_int(), 0);
                assert_eq!(vel.as_int(), 64);
                note_ons.push(key.as_int());
            }
        }
        assert_eq!(note_ons, vec![60, 64, 67, 69, 72, 76, 65, 69, 72]);
    }

    #[test]
    fn note_offs_are_real_note_offs() {
        let bytes = to_smf(&progression(), 480);
        let smf = Smf::parse(&bytes).unwrap();

        let offs = smf.tracks[0]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOff { .. },
                        ..
                    }
                )
            })
            .count();
        assert_eq!(offs, 9);
    }

    #[test]
    fn tempo_only_file_is_valid() {
        let events = synthesize(&[], &SynthParams::default()).unwrap();
        let bytes = to_smf(&events, 96);
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(96)));
        assert_eq!(smf.tracks[0].len(), 2);
    }

    #[test]
    fn largest_metrical_division_parses() {
        let params = SynthParams {
            ticks_per_beat: 0x7FFF,
            ..SynthParams::default()
        };
        let events = synthesize(&[ChordSegment::new(0.0, 1.0, "C")], &params).unwrap();
        let bytes = to_smf(&events, params.ticks_per_beat);
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(0x7FFF)));
    }

    #[test]
    fn vlq_encoding() {
        let mut buf = Vec::new();
        write_vlq(&mut buf, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        write_vlq(&mut buf, 127);
        assert_eq!(buf, vec![0x7F]);

        buf.clear();
        write_vlq(&mut buf, 128);
        assert_eq!(buf, vec![0x81, 0x00]);

        buf.clear();
        write_vlq(&mut buf, 480);
        assert_eq!(buf, vec![0x83, 0x60]);

        buf.clear();
        write_vlq(&mut buf, 0x0FFF_FFFF);
        assert_eq!(buf, vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }
}
