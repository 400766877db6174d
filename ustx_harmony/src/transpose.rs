// Interval shift with key correction.
//
// A harmony note is the source note moved by a fixed number of semitones,
// down for a lower harmony and up for an upper one. If the shifted note
// falls outside the key it is walked back toward the source note one
// semitone at a time, at most `MAX_CORRECTION_STEPS` times. When that walk
// never lands in the key the plain shifted tone is used instead. The search
// only ever moves one way and is capped; it is not a nearest-in-scale snap.

use serde::{Deserialize, Serialize};

use crate::document::Note;
use crate::error::HarmonyError;
use crate::key::Key;

/// Upper bound on semitone steps taken while looking for an in-key tone.
pub const MAX_CORRECTION_STEPS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Lower,
    Upper,
}

impl Direction {
    /// Suffix used when naming the generated track.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Lower => "Lower Harmony",
            Direction::Upper => "Upper Harmony",
        }
    }

    /// Saturates at the ends of `i64` instead of overflowing.
    fn shift(self, tone: i64, interval: i64) -> i64 {
        match self {
            Direction::Lower => tone.saturating_sub(interval),
            Direction::Upper => tone.saturating_add(interval),
        }
    }

    /// Correction moves back toward the source: up for lower harmonies,
    /// down for upper ones.
    fn correction_step(self) -> i64 {
        match self {
            Direction::Lower => 1,
            Direction::Upper => -1,
        }
    }
}

/// Harmony tone for a single source tone.
pub fn harmonize_tone(tone: i64, interval: i64, direction: Direction, key: Key) -> i64 {
    let shifted = direction.shift(tone, interval);
    let mut candidate = shifted;
    let mut attempts = 0;
    while !key.contains(candidate) && attempts < MAX_CORRECTION_STEPS {
        candidate = candidate.saturating_add(direction.correction_step());
        attempts += 1;
    }
    if key.contains(candidate) {
        candidate
    } else {
        shifted
    }
}

/// Harmony notes for a whole sequence. Each output note is a copy of its
/// source with only `tone` changed.
pub fn transpose_notes(
    notes: &[Note],
    interval: i64,
    direction: Direction,
    key: Key,
) -> Result<Vec<Note>, HarmonyError> {
    notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let tone = note.tone().ok_or(HarmonyError::MissingTone { index })?;
            Ok(note.with_tone(harmonize_tone(tone, interval, direction, key)))
        })
        .collect()
}
