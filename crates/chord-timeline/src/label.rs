//! Recognizer label normalization.
//!
//! The recognizer speaks MIREX-style `ROOT:QUALITY` labels (`C:maj`,
//! `A:min`, `G:7`) with `N` for "no chord". Downstream code only knows
//! the 24-label canonical alphabet: a bare root for major, root + `m`
//! for minor.

use std::fmt;

/// The recognizer's reserved "no chord" token.
pub const NO_CHORD: &str = "N";

/// A chord label in the canonical alphabet, or silence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalLabel {
    /// `"C"`, `"F#"`, `"Am"`, or a pass-through token
    Chord(String),
    NoChord,
}

impl CanonicalLabel {
    pub fn is_no_chord(&self) -> bool {
        matches!(self, CanonicalLabel::NoChord)
    }

    pub fn as_chord(&self) -> Option<&str> {
        match self {
            CanonicalLabel::Chord(name) => Some(name),
            CanonicalLabel::NoChord => None,
        }
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalLabel::Chord(name) => write!(f, "{}", name),
            CanonicalLabel::NoChord => write!(f, "{}", NO_CHORD),
        }
    }
}

/// Result of normalizing one label, with the quality that was dropped
/// when it fell outside major/minor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub label: CanonicalLabel,
    /// `Some("dim")` for `B:dim` etc. `None` for major, minor, and pass-through.
    pub collapsed_quality: Option<String>,
}

/// Map a recognizer label to the canonical alphabet.
///
/// Never fails: unknown shapes pass through unchanged.
pub fn normalize(raw: &str) -> CanonicalLabel {
    normalize_detailed(raw).label
}

/// Like [`normalize`], but reports which quality (if any) was collapsed
/// into the bare root.
pub fn normalize_detailed(raw: &str) -> Normalized {
    if raw == NO_CHORD {
        return Normalized {
            label: CanonicalLabel::NoChord,
            collapsed_quality: None,
        };
    }

    let Some((root, quality)) = raw.split_once(':') else {
        return Normalized {
            label: CanonicalLabel::Chord(raw.to_string()),
            collapsed_quality: None,
        };
    };

    match quality {
        "min" | "minor" => {
            let name = if root.ends_with('m') {
                root.to_string()
            } else {
                format!("{}m", root)
            };
            Normalized {
                label: CanonicalLabel::Chord(name),
                collapsed_quality: None,
            }
        }
        "maj" | "major" => Normalized {
            label: CanonicalLabel::Chord(root.to_string()),
            collapsed_quality: None,
        },
        other => Normalized {
            label: CanonicalLabel::Chord(root.to_string()),
            collapsed_quality: Some(other.to_string()),
        },
    }
}
