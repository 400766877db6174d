// Reading and writing `.ustx` project files.
//
// USTX is YAML. Files are decoded straight into the core's order-preserving
// `Document` (a `serde_json` map), so unknown keys and key order survive a
// load/save cycle. Paths without a `.ustx` suffix get one appended, for both
// reading and writing.
//
// Failures are split into the categories a user needs to tell apart: the
// file is missing, the file could not be read, its content is not a USTX
// mapping, or the output could not be written.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use ustx_harmony::Document;

pub const EXTENSION: &str = "ustx";

#[derive(Debug, Error)]
pub enum UstxError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed USTX content in {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("could not write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
}

/// Append `.ustx` unless the path already ends with it (any case).
pub fn resolve_ustx_path(path: &Path) -> PathBuf {
    let suffix = format!(".{EXTENSION}");
    if path.to_string_lossy().to_lowercase().ends_with(&suffix) {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_owned();
    raw.push(&suffix);
    PathBuf::from(raw)
}

/// Decode USTX text. The top level must be a mapping.
pub fn parse_document(text: &str) -> Result<Document, UstxError> {
    parse_with_origin(text, "<memory>")
}

fn parse_with_origin(text: &str, origin: &str) -> Result<Document, UstxError> {
    let malformed = |reason: String| UstxError::Malformed {
        origin: origin.to_string(),
        reason,
    };
    let value: Value = serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))?;
    match value {
        Value::Object(fields) => Ok(Document::new(fields)),
        Value::Null => Err(malformed("document is empty".to_string())),
        other => Err(malformed(format!(
            "top level is {}, expected a mapping",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Encode a document as USTX text, keeping key order.
pub fn render_document(document: &Document) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(document)
}

/// Load a project file. See [`resolve_ustx_path`] for the path rule.
pub fn load_document(path: &Path) -> Result<Document, UstxError> {
    let path = resolve_ustx_path(path);
    let text = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => UstxError::NotFound { path: path.clone() },
        _ => UstxError::Read {
            path: path.clone(),
            source,
        },
    })?;
    let document = parse_with_origin(&text, &path.display().to_string())?;
    log::debug!("Loaded {}", path.display());
    Ok(document)
}

/// Save a project file, returning the path actually written.
pub fn save_document(document: &Document, path: &Path) -> Result<PathBuf, UstxError> {
    let path = resolve_ustx_path(path);
    let write_error = |reason: String| UstxError::Write {
        path: path.clone(),
        reason,
    };
    let text = render_document(document).map_err(|e| write_error(e.to_string()))?;
    std::fs::write(&path, text).map_err(|e| write_error(e.to_string()))?;
    log::debug!("Saved {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name: Sample
comment: ''
output_dir: Vocal
cache_dir: UCache
ustx_version: '0.6'
bpm: 120
tracks:
- singer: Kasane
  phonemizer: OpenUtau.Core.DefaultPhonemizer
  track_name: Lead
  mute: false
voice_parts:
- duration: 1920
  name: Lead Part
  comment: ''
  track_no: 0
  position: 0
  notes:
  - position: 0
    duration: 480
    tone: 60
    lyric: あ
  curves: []
wave_parts: []
";

    #[test]
    fn path_suffix_is_appended_once() {
        assert_eq!(resolve_ustx_path(Path::new("song")), PathBuf::from("song.ustx"));
        assert_eq!(resolve_ustx_path(Path::new("song.USTX")), PathBuf::from("song.USTX"));
        assert_eq!(resolve_ustx_path(Path::new("dir/song.yaml")), PathBuf::from("dir/song.yaml.ustx"));
    }

    #[test]
    fn parse_exposes_tracks_and_notes() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.track_names().unwrap(), vec!["Lead"]);
        let notes = doc.notes_for_track(0).unwrap();
        assert_eq!(notes[0].tone(), Some(60));
        assert_eq!(notes[0].fields()["lyric"], Value::from("あ"));
    }

    #[test]
    fn render_keeps_key_order() {
        let doc = parse_document(SAMPLE).unwrap();
        let text = render_document(&doc).unwrap();
        let keys: Vec<&str> = text
            .lines()
            .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            vec!["name", "comment", "output_dir", "cache_dir", "ustx_version", "bpm", "tracks", "voice_parts", "wave_parts"]
        );
        assert_eq!(parse_document(&text).unwrap(), doc);
    }

    #[test]
    fn version_string_stays_a_string() {
        let doc = parse_document(SAMPLE).unwrap();
        let again = parse_document(&render_document(&doc).unwrap()).unwrap();
        assert_eq!(again.fields()["ustx_version"], Value::from("0.6"));
    }

    #[test]
    fn non_mapping_content_is_malformed() {
        assert!(matches!(parse_document("- 1\n- 2\n"), Err(UstxError::Malformed { .. })));
        assert!(matches!(parse_document(""), Err(UstxError::Malformed { .. })));
        assert!(matches!(parse_document("tracks: [\n"), Err(UstxError::Malformed { .. })));
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("ustx_harmony_definitely_missing_file");
        match load_document(&path) {
            Err(UstxError::NotFound { path }) => {
                assert!(path.to_string_lossy().ends_with(".ustx"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
