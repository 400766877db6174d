// USTX harmony core
//
// Synthesizes harmony tracks for a vocal-synthesis project (the YAML-based
// USTX score format). A source track's melody is shifted by a fixed number
// of semitones and each shifted note is nudged back into the project's key,
// which is either detected statistically from the notes or chosen by hand.
// The result is spliced into the document as new tracks and voice parts.
//
// Architecture:
// - document.rs:  Order-preserving model of the project document (tracks,
//                 voice parts, notes) over opaque `serde_json` maps
// - key.rs:       Key and mode types, canonical pitch-class names, parsing
// - scale.rs:     Diatonic scale membership for a key
// - profile.rs:   Pitch-class histograms and the 24-key profile scorer
// - detect.rs:    Key detection on top of the scorer, with a ranking observer
// - transpose.rs: Interval shift plus bounded one-directional key correction
// - harmonize.rs: Builds the new tracks/voice parts and appends them
// - error.rs:     `HarmonyError`
//
// The crate is pure data-in/data-out: no file access, no threads. Reading
// and writing `.ustx` files lives in `ustx_harmony_app`.

pub mod detect;
pub mod document;
pub mod error;
pub mod harmonize;
pub mod key;
pub mod profile;
pub mod scale;
pub mod transpose;

pub use detect::{
    KeyDetection, detect_key, detect_key_for_notes, detect_key_with, log_top_candidates,
};
pub use document::{Document, Fields, Note, Track, VoicePart};
pub use error::HarmonyError;
pub use harmonize::{HarmonySettings, HarmonyType, harmonize};
pub use key::{KEY_NAMES, Key, Mode, pitch_class};
pub use profile::{KeyProfiles, KeyScore, PitchHistogram};
pub use scale::in_scale;
pub use transpose::{Direction, harmonize_tone, transpose_notes};
