// Key profile scoring.
//
// Key-finding by profile correlation: count how often each pitch class
// occurs, then score each of the 24 major/minor keys by weighting those
// counts with a tonal-hierarchy profile rotated onto the candidate tonic.
// The profiles are the Krumhansl-Kessler tone ratings.
//
// Ranking is deterministic. Candidates are generated tonic by tonic, major
// before minor, and stable-sorted by descending score, so equal scores keep
// generation order (lower tonic first, major before minor).
//
// `KeyProfiles` is serde-(de)serializable so alternative weightings can be
// supplied from a JSON file without recompiling.

use serde::{Deserialize, Serialize};

use crate::key::{Key, Mode, pitch_class};

/// Occurrence count per pitch class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PitchHistogram {
    counts: [u32; 12],
}

impl PitchHistogram {
    pub fn from_counts(counts: [u32; 12]) -> Self {
        PitchHistogram { counts }
    }

    pub fn from_tones<I: IntoIterator<Item = i64>>(tones: I) -> Self {
        let mut counts = [0u32; 12];
        for tone in tones {
            counts[pitch_class(tone) as usize] += 1;
        }
        PitchHistogram { counts }
    }

    pub fn counts(&self) -> &[u32; 12] {
        &self.counts
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// One candidate key and its profile score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyScore {
    pub key: Key,
    pub score: f64,
}

/// Weight profiles for both modes, index 0 = tonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyProfiles {
    pub major: [f64; 12],
    pub minor: [f64; 12],
}

impl Default for KeyProfiles {
    fn default() -> Self {
        KeyProfiles {
            major: [
                6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 3.78, 2.14, 4.04, 2.0, 3.5,
            ],
            minor: [
                6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 2.53, 4.48, 2.42, 3.17, 2.35,
            ],
        }
    }
}

impl KeyProfiles {
    pub fn profile(&self, mode: Mode) -> &[f64; 12] {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Score of a single key: sum over `i` of
    /// `histogram[(tonic + i) % 12] * profile[i]`.
    pub fn score(&self, histogram: &PitchHistogram, key: Key) -> f64 {
        let profile = self.profile(key.mode);
        let tonic = (key.tonic % 12) as usize;
        (0..12)
            .map(|i| f64::from(histogram.counts[(tonic + i) % 12]) * profile[i])
            .sum()
    }

    /// All 24 keys, best first. Ties keep generation order.
    pub fn rank(&self, histogram: &PitchHistogram) -> Vec<KeyScore> {
        let mut scores: Vec<KeyScore> = (0..12u8)
            .flat_map(|tonic| Mode::ALL.into_iter().map(move |mode| Key::new(tonic, mode)))
            .map(|key| KeyScore {
                key,
                score: self.score(histogram, key),
            })
            .collect();
        // sort_by is stable.
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }
}
