// Error type for the harmony core.
//
// The core never touches the filesystem, so every failure is about the data
// it was handed: a key that names none of the 24 major/minor keys, a
// document whose track or voice-part lists have the wrong shape, a note
// without an integer tone, or a track selection past the end of the list.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    /// Manual key name not among the 12 canonical names, or mode not
    /// `major`/`minor`.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A structural field the core needs (`tracks`, `voice_parts`, `notes`,
    /// `track_no`) has an unexpected shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Note at `index` (within the sequence being processed) has no integer
    /// `tone` field.
    #[error("note {index} has no integer tone")]
    MissingTone { index: usize },

    /// `MissingTone` located within the notes gathered for `track`.
    #[error("track {track}: note {index} has no integer tone")]
    TrackMissingTone { track: usize, index: usize },

    #[error("track index {index} out of range (document has {count} tracks)")]
    TrackOutOfRange { index: usize, count: usize },
}

impl HarmonyError {
    /// Attach the source track to a `MissingTone`; other errors pass through.
    pub fn in_track(self, track: usize) -> Self {
        match self {
            HarmonyError::MissingTone { index } => HarmonyError::TrackMissingTone { track, index },
            other => other,
        }
    }
}
