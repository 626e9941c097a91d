//! Human-readable timeline output and output file naming.

use crate::merge::ChordSegment;

/// Format the first `limit` segments, one per line, with a trailing
/// count of the rest.
///
/// ```text
///   0.00s - 2.00s (2.00s): C
///   ... and 3 more chord segments
/// ```
pub fn preview(segments: &[ChordSegment], limit: usize) -> String {
    let mut output = String::new();

    for segment in segments.iter().take(limit) {
        output.push_str(&format!(
            "  {:.2}s - {:.2}s ({:.2}s): {}\n",
            segment.start,
            segment.end,
            segment.duration(),
            segment.label
        ));
    }

    if segments.len() > limit {
        output.push_str(&format!(
            "  ... and {} more chord segments\n",
            segments.len() - limit
        ));
    }

    output
}

/// Derive a MIDI file name from a song or input name.
///
/// Keeps alphanumerics, spaces, `-` and `_`, trims, turns spaces into
/// underscores, and appends `{suffix}.mid`.
pub fn output_file_name(name: &str, suffix: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim().replace(' ', "_");
    format!("{}{}.mid", safe, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preview_lists_segments() {
        let segments = vec![
            ChordSegment::new(0.0, 2.0, "C"),
            ChordSegment::new(2.0, 3.5, "Am"),
        ];
        assert_eq!(
            preview(&segments, 20),
            "  0.00s - 2.00s (2.00s): C\n  2.00s - 3.50s (1.50s): Am\n"
        );
    }

    #[test]
    fn preview_truncates() {
        let segments: Vec<_> = (0..25)
            .map(|i| ChordSegment::new(i as f64, i as f64 + 1.0, "G"))
            .collect();
        let text = preview(&segments, 20);

        assert_eq!(text.lines().count(), 21);
        assert!(text.ends_with("  ... and 5 more chord segments\n"));
    }

    #[test]
    fn preview_empty() {
        assert_eq!(preview(&[], 20), "");
    }

    #[test]
    fn file_name_sanitized() {
        assert_eq!(
            output_file_name("Let It Be (Remastered)", "_chords"),
            "Let_It_Be_Remastered_chords.mid"
        );
        assert_eq!(output_file_name("  AC/DC - T.N.T.  ", "_chords"), "ACDC_-_TNT_chords.mid");
        assert_eq!(output_file_name("song_01", ""), "song_01.mid");
    }
}
