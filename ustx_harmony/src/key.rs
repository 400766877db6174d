// Musical key representation.
//
// A key is a tonic pitch class (0 = C .. 11 = B) plus a mode. Only the two
// modern modes are modelled; scale membership for them lives in `scale.rs`.
// Tonic names use the canonical twelve spellings the USTX harmonizer has
// always presented (`C`, `C#/Db`, ...), and parsing also accepts either half
// of a sharp/flat pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarmonyError;

/// Canonical pitch-class names, indexed by pitch class.
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// Pitch class of a tone in `0..12`, also for negative tones.
pub fn pitch_class(tone: i64) -> u8 {
    tone.rem_euclid(12) as u8
}

/// Look up a tonic by name. Accepts a canonical name (`"F#/Gb"`) or either
/// spelling on its own (`"F#"`, `"Gb"`), ignoring ASCII case.
pub fn tonic_index(name: &str) -> Option<u8> {
    let name = name.trim();
    KEY_NAMES
        .iter()
        .position(|canonical| {
            canonical.eq_ignore_ascii_case(name)
                || canonical.split('/').any(|spelling| spelling.eq_ignore_ascii_case(name))
        })
        .map(|i| i as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    /// Natural minor.
    Minor,
}

impl Mode {
    /// Generation order used by the key scorer: major before minor.
    pub const ALL: [Mode; 2] = [Mode::Major, Mode::Minor];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Mode::Major),
            "minor" => Ok(Mode::Minor),
            _ => Err(HarmonyError::InvalidKey(format!(
                "unknown mode {s:?} (expected \"major\" or \"minor\")"
            ))),
        }
    }
}

/// A tonic pitch class plus a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyFields")]
pub struct Key {
    /// Pitch class of the tonic (0 = C, 2 = D, ...).
    pub tonic: u8,
    pub mode: Mode,
}

impl Key {
    /// C major. Used whenever there are no notes to detect a key from.
    pub const DEFAULT: Key = Key {
        tonic: 0,
        mode: Mode::Major,
    };

    pub fn new(tonic: u8, mode: Mode) -> Self {
        Key {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Resolve a manually chosen key from its tonic name and mode string.
    pub fn from_names(tonic: &str, mode: &str) -> Result<Self, HarmonyError> {
        let index = tonic_index(tonic).ok_or_else(|| {
            HarmonyError::InvalidKey(format!(
                "unknown key name {tonic:?} (expected one of {})",
                KEY_NAMES.join(", ")
            ))
        })?;
        Ok(Key::new(index, mode.parse()?))
    }

    pub fn tonic_name(self) -> &'static str {
        KEY_NAMES[(self.tonic % 12) as usize]
    }
}

/// Unchecked wire form of [`Key`].
#[derive(Deserialize)]
struct KeyFields {
    tonic: u8,
    mode: Mode,
}

impl TryFrom<KeyFields> for Key {
    type Error = HarmonyError;

    fn try_from(fields: KeyFields) -> Result<Self, Self::Error> {
        if fields.tonic >= 12 {
            return Err(HarmonyError::InvalidKey(format!(
                "tonic {} is not a pitch class (0..=11)",
                fields.tonic
            )));
        }
        Ok(Key::new(fields.tonic, fields.mode))
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::DEFAULT
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic_name(), self.mode)
    }
}
