// Key detection from a note sequence.
//
// Builds a pitch-class histogram and picks the best-ranked key from
// `KeyProfiles::rank`. An empty histogram short-circuits to C major without
// scoring anything.
//
// The full ranking is handed to an observer before the winner is taken.
// `detect_key` uses an observer that logs the top candidates at debug
// level; callers that present the ranking themselves use `detect_key_with`.
// The observer never influences the result.

use crate::document::{Note, tones};
use crate::error::HarmonyError;
use crate::key::Key;
use crate::profile::{KeyProfiles, KeyScore, PitchHistogram};

/// Number of candidates `log_top_candidates` reports.
pub const REPORTED_CANDIDATES: usize = 5;

/// Outcome of key detection.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDetection {
    pub key: Key,
    /// All 24 candidates, best first. Empty when there were no notes.
    pub ranking: Vec<KeyScore>,
}

impl KeyDetection {
    pub fn tonic_name(&self) -> &'static str {
        self.key.tonic_name()
    }

    pub fn top(&self, n: usize) -> &[KeyScore] {
        &self.ranking[..n.min(self.ranking.len())]
    }
}

/// Detect the key of `tones` with the default profiles, logging the top
/// candidates.
pub fn detect_key<I: IntoIterator<Item = i64>>(tones: I) -> KeyDetection {
    detect_key_with(tones, &KeyProfiles::default(), log_top_candidates)
}

/// Detect the key of `tones` with explicit profiles. `observe` receives the
/// full ranking; it is not called when there are no tones.
pub fn detect_key_with<I, F>(tones: I, profiles: &KeyProfiles, mut observe: F) -> KeyDetection
where
    I: IntoIterator<Item = i64>,
    F: FnMut(&[KeyScore]),
{
    let histogram = PitchHistogram::from_tones(tones);
    if histogram.is_empty() {
        log::warn!("No notes to detect a key from; defaulting to {}", Key::DEFAULT);
        return KeyDetection {
            key: Key::DEFAULT,
            ranking: Vec::new(),
        };
    }

    log::debug!("Detecting key from {} notes", histogram.total());
    let ranking = profiles.rank(&histogram);
    observe(&ranking);

    let key = ranking.first().map_or(Key::DEFAULT, |best| best.key);
    KeyDetection { key, ranking }
}

/// Detect the key of a note sequence. Fails if any note lacks a tone.
pub fn detect_key_for_notes(notes: &[Note]) -> Result<KeyDetection, HarmonyError> {
    Ok(detect_key(tones(notes)?))
}

/// Observer that logs the best few candidates at debug level.
pub fn log_top_candidates(ranking: &[KeyScore]) {
    log::debug!("Key detection scores (top {REPORTED_CANDIDATES}):");
    for candidate in ranking.iter().take(REPORTED_CANDIDATES) {
        log::debug!("  {}: {:.2}", candidate.key, candidate.score);
    }
}
