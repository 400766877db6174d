// Harmony track synthesis.
//
// For every selected source track, in the order given, the track's notes
// are gathered from its voice parts and run through the transposer once per
// requested direction (lower before upper). Each result becomes a new track,
// a renamed copy of the source, plus one voice part holding the harmony
// notes.
//
// Numbering: new voice parts point at track indices starting at the
// pre-call track count and increasing by one per created track. Tracks and
// voice parts are staged while every selected track is processed and only
// appended once all of them succeeded, so the final `tracks` order matches
// those indices and a failed call leaves the document as it was. Existing
// tracks and voice parts are never modified.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, VoicePart, placeholder_track_name};
use crate::error::HarmonyError;
use crate::key::Key;
use crate::transpose::{Direction, transpose_notes};

/// Which harmony tracks to create per source track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonyType {
    #[default]
    #[serde(rename = "lower")]
    LowerOnly,
    #[serde(rename = "upper")]
    UpperOnly,
    Both,
}

impl HarmonyType {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            HarmonyType::LowerOnly => &[Direction::Lower],
            HarmonyType::UpperOnly => &[Direction::Upper],
            HarmonyType::Both => &[Direction::Lower, Direction::Upper],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HarmonyType::LowerOnly => "lower",
            HarmonyType::UpperOnly => "upper",
            HarmonyType::Both => "both",
        }
    }
}

impl fmt::Display for HarmonyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HarmonyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lower" => Ok(HarmonyType::LowerOnly),
            "upper" => Ok(HarmonyType::UpperOnly),
            "both" => Ok(HarmonyType::Both),
            _ => Err(format!("unknown harmony type {s:?} (expected lower, upper or both)")),
        }
    }
}

/// Legacy numeric selector: 1 = lower, 2 = upper, 3 = both.
impl TryFrom<u8> for HarmonyType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(HarmonyType::LowerOnly),
            2 => Ok(HarmonyType::UpperOnly),
            3 => Ok(HarmonyType::Both),
            _ => Err(format!("unknown harmony type code {code}")),
        }
    }
}

/// Parameters shared by every harmony track created in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonySettings {
    pub harmony_type: HarmonyType,
    /// Semitones between source and harmony. Negative values flip the
    /// direction of the shift.
    pub semitone_interval: i64,
    pub key: Key,
}

/// Append harmony tracks for `selected` (zero-based track indices) to
/// `document`. Returns the names of the new tracks in creation order.
///
/// A selected track with no notes yields harmony tracks with no notes. On
/// any error (an index past the end of `tracks`, a note without a tone) the
/// document is left unchanged.
pub fn harmonize(
    document: &mut Document,
    selected: &[usize],
    settings: &HarmonySettings,
) -> Result<Vec<String>, HarmonyError> {
    let tracks = document.tracks()?;
    let original_count = tracks.len();
    if let Some(&index) = selected.iter().find(|&&i| i >= original_count) {
        return Err(HarmonyError::TrackOutOfRange {
            index,
            count: original_count,
        });
    }
    let duration = document
        .voice_parts()?
        .first()
        .and_then(|part| part.duration().cloned())
        .unwrap_or_else(|| Value::from(0));

    log::info!(
        "Harmonizing {} track(s): {} harmony, {} semitones, key {}",
        selected.len(),
        settings.harmony_type,
        settings.semitone_interval,
        settings.key
    );

    let mut staged_tracks = Vec::new();
    let mut staged_parts = Vec::new();
    let mut names = Vec::new();
    for &index in selected {
        let source = &tracks[index];
        let source_name = source
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| placeholder_track_name(index));
        let notes = document.notes_for_track(index)?;
        if notes.is_empty() {
            log::warn!("Track {index} ({source_name}) has no notes; its harmony tracks will be empty");
        }

        for &direction in settings.harmony_type.directions() {
            let harmony_notes =
                transpose_notes(&notes, settings.semitone_interval, direction, settings.key)
                    .map_err(|e| e.in_track(index))?;
            let name = format!("{source_name} - {}", direction.label());
            let track_no = original_count + staged_tracks.len();
            log::debug!(
                "Creating track {track_no} ({name}) with {} notes",
                harmony_notes.len()
            );
            staged_parts.push(VoicePart::synthesized(
                &format!("{name} Part"),
                track_no,
                duration.clone(),
                harmony_notes,
            ));
            staged_tracks.push(source.renamed(&name));
            names.push(name);
        }
    }

    for part in staged_parts {
        document.push_voice_part(part)?;
    }
    for track in staged_tracks {
        document.push_track(track)?;
    }
    Ok(names)
}
