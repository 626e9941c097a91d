use crate::label::CanonicalLabel;

/// Three MIDI pitches, root position.
pub type NoteTriad = [u8; 3];

struct TriadEntry {
    label: &'static str,
    notes: NoteTriad,
}

impl TriadEntry {
    const fn major(label: &'static str, root: u8) -> Self {
        Self {
            label,
            notes: [root, root + 4, root + 7],
        }
    }

    const fn minor(label: &'static str, root: u8) -> Self {
        Self {
            label,
            notes: [root, root + 3, root + 7],
        }
    }
}

/// The playable alphabet: 12 major + 12 minor triads, C major rooted at middle C (60).
static TRIADS: &[TriadEntry] = &[
    TriadEntry::major("C", 60),
    TriadEntry::major("C#", 61),
    TriadEntry::major("D", 62),
    TriadEntry::major("D#", 63),
    TriadEntry::major("E", 64),
    TriadEntry::major("F", 65),
    TriadEntry::major("F#", 66),
    TriadEntry::major("G", 67),
    TriadEntry::major("G#", 68),
    TriadEntry::major("A", 69),
    TriadEntry::major("A#", 70),
    TriadEntry::major("B", 71),
    TriadEntry::minor("Cm", 60),
    TriadEntry::minor("C#m", 61),
    TriadEntry::minor("Dm", 62),
    TriadEntry::minor("D#m", 63),
    TriadEntry::minor("Em", 64),
    TriadEntry::minor("Fm", 65),
    TriadEntry::minor("F#m", 66),
    TriadEntry::minor("Gm", 67),
    TriadEntry::minor("G#m", 68),
    TriadEntry::minor("Am", 69),
    TriadEntry::minor("A#m", 70),
    TriadEntry::minor("Bm", 71),
];

/// Look up the triad for a canonical label.
///
/// `None` for no-chord and for anything outside the table (flat
/// spellings, pass-through tokens). Callers skip those segments.
pub fn notes_for(label: &CanonicalLabel) -> Option<NoteTriad> {
    label.as_chord().and_then(notes_for_name)
}

/// Same as [`notes_for`], keyed by chord name.
pub fn notes_for_name(name: &str) -> Option<NoteTriad> {
    TRIADS
        .iter()
        .find(|entry| entry.label == name)
        .map(|entry| entry.notes)
}
