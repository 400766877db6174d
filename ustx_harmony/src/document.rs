// Project document model.
//
// A USTX project is an extensible YAML mapping. The harmonizer only cares
// about two of its sequences, `tracks` and `voice_parts`, and about a few
// fields inside them (`track_name`, `track_no`, `notes`, `tone`). Everything
// else must survive a load/harmonize/save cycle untouched and in its
// original key order, so every record here is a thin newtype over an
// insertion-ordered `serde_json` map rather than a fixed struct.
//
// Accessors decode lazily and report shape problems as
// `HarmonyError::MalformedDocument`. Missing or null sequences read as
// empty; this matches how the authoring tool writes a fresh project.
//
// See also: `harmonize.rs`, the only code that mutates a `Document`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HarmonyError;

/// Insertion-ordered string-keyed map carrying all opaque fields.
pub type Fields = Map<String, Value>;

const TRACKS: &str = "tracks";
const VOICE_PARTS: &str = "voice_parts";
const TRACK_NAME: &str = "track_name";
const TRACK_NO: &str = "track_no";
const NOTES: &str = "notes";
const TONE: &str = "tone";

/// Display name for a track that has no `track_name`. `index` is zero-based;
/// the generated name counts from 1.
pub fn placeholder_track_name(index: usize) -> String {
    format!("Track {}", index + 1)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single note. Only `tone` (semitones, arbitrary octave) is interpreted;
/// lyric, position, duration and the rest ride along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(Fields);

impl Note {
    pub fn new(fields: Fields) -> Self {
        Note(fields)
    }

    /// A note holding nothing but a tone.
    pub fn from_tone(tone: i64) -> Self {
        let mut fields = Fields::new();
        fields.insert(TONE.to_string(), Value::from(tone));
        Note(fields)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn tone(&self) -> Option<i64> {
        self.0.get(TONE).and_then(Value::as_i64)
    }

    /// Copy of this note with `tone` replaced. The field keeps its position
    /// in the map; every other field is cloned as-is.
    pub fn with_tone(&self, tone: i64) -> Self {
        let mut fields = self.0.clone();
        fields.insert(TONE.to_string(), Value::from(tone));
        Note(fields)
    }
}

/// Extract the tone of every note, failing on the first note without one.
pub fn tones(notes: &[Note]) -> Result<Vec<i64>, HarmonyError> {
    notes
        .iter()
        .enumerate()
        .map(|(index, note)| note.tone().ok_or(HarmonyError::MissingTone { index }))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(Fields);

impl Track {
    pub fn new(fields: Fields) -> Self {
        Track(fields)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(TRACK_NAME).and_then(Value::as_str)
    }

    /// Shallow copy with `track_name` rewritten. Singer, phonemizer, mute
    /// state etc. are kept so the new track sounds like its source.
    pub fn renamed(&self, name: &str) -> Self {
        let mut fields = self.0.clone();
        fields.insert(TRACK_NAME.to_string(), Value::from(name));
        Track(fields)
    }
}

/// A voice part: a block of notes attached to a track by position.
///
/// `track_no` is the zero-based index of the owning track in `tracks`, not a
/// stable id. Several parts may share a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoicePart(Fields);

impl VoicePart {
    pub fn new(fields: Fields) -> Self {
        VoicePart(fields)
    }

    /// A freshly synthesized part: starts at position 0, no comment, no
    /// curves. Field order follows what the authoring tool writes.
    pub fn synthesized(name: &str, track_no: usize, duration: Value, notes: Vec<Note>) -> Self {
        let mut fields = Fields::new();
        fields.insert("duration".to_string(), duration);
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("comment".to_string(), Value::from(""));
        fields.insert(TRACK_NO.to_string(), Value::from(track_no));
        fields.insert("position".to_string(), Value::from(0));
        fields.insert(
            NOTES.to_string(),
            Value::Array(notes.into_iter().map(|n| Value::Object(n.0)).collect()),
        );
        fields.insert("curves".to_string(), Value::Array(Vec::new()));
        VoicePart(fields)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn duration(&self) -> Option<&Value> {
        self.0.get("duration")
    }

    /// Owning track index. Absent reads as 0; integer-valued strings are
    /// accepted since some hand-edited projects quote it.
    pub fn track_no(&self) -> Result<i64, HarmonyError> {
        match self.0.get(TRACK_NO) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                HarmonyError::MalformedDocument(format!("track_no {n} is not an integer"))
            }),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| {
                HarmonyError::MalformedDocument(format!("track_no {s:?} is not an integer"))
            }),
            Some(other) => Err(HarmonyError::MalformedDocument(format!(
                "track_no has unexpected value {other}"
            ))),
        }
    }

    pub fn notes(&self) -> Result<Vec<Note>, HarmonyError> {
        decode_mappings(self.0.get(NOTES), NOTES).map(|fields| fields.into_iter().map(Note).collect())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The whole project. Keys other than `tracks` and `voice_parts` are opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Fields);

impl Document {
    pub fn new(fields: Fields) -> Self {
        Document(fields)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    pub fn tracks(&self) -> Result<Vec<Track>, HarmonyError> {
        decode_mappings(self.0.get(TRACKS), TRACKS).map(|fields| fields.into_iter().map(Track).collect())
    }

    pub fn track_count(&self) -> Result<usize, HarmonyError> {
        match self.0.get(TRACKS) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Array(items)) => Ok(items.len()),
            Some(_) => Err(not_a_sequence(TRACKS)),
        }
    }

    pub fn voice_parts(&self) -> Result<Vec<VoicePart>, HarmonyError> {
        decode_mappings(self.0.get(VOICE_PARTS), VOICE_PARTS)
            .map(|fields| fields.into_iter().map(VoicePart).collect())
    }

    /// Presentation names for every track, falling back to `"Track <n>"`.
    pub fn track_names(&self) -> Result<Vec<String>, HarmonyError> {
        Ok(self
            .tracks()?
            .iter()
            .enumerate()
            .map(|(i, track)| {
                track
                    .name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| placeholder_track_name(i))
            })
            .collect())
    }

    /// All notes belonging to the track at `index`: the notes of every voice
    /// part with a matching `track_no`, concatenated in document order.
    pub fn notes_for_track(&self, index: usize) -> Result<Vec<Note>, HarmonyError> {
        let mut notes = Vec::new();
        for part in self.voice_parts()? {
            if usize::try_from(part.track_no()?).ok() == Some(index) {
                notes.extend(part.notes()?);
            }
        }
        Ok(notes)
    }

    pub fn push_track(&mut self, track: Track) -> Result<(), HarmonyError> {
        self.sequence_mut(TRACKS)?.push(Value::Object(track.0));
        Ok(())
    }

    pub fn push_voice_part(&mut self, part: VoicePart) -> Result<(), HarmonyError> {
        self.sequence_mut(VOICE_PARTS)?.push(Value::Object(part.0));
        Ok(())
    }

    /// Mutable access to a top-level sequence, creating it (at the end of the
    /// mapping) when absent or null.
    fn sequence_mut(&mut self, key: &str) -> Result<&mut Vec<Value>, HarmonyError> {
        let slot = self.0.entry(key).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut().ok_or_else(|| not_a_sequence(key))
    }
}

fn not_a_sequence(what: &str) -> HarmonyError {
    HarmonyError::MalformedDocument(format!("`{what}` is not a sequence"))
}

/// Decode an optional sequence of mappings. Absent or null is empty.
fn decode_mappings(value: Option<&Value>, what: &str) -> Result<Vec<Fields>, HarmonyError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(not_a_sequence(what)),
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object().cloned().ok_or_else(|| {
                HarmonyError::MalformedDocument(format!("`{what}` entry {i} is not a mapping"))
            })
        })
        .collect()
}
