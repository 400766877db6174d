// Harmony jobs: one complete load -> key -> harmonize -> save request.
//
// A `HarmonyJob` carries everything the front end collects from the user:
// source and destination paths, the selected tracks, which harmonies to
// create, the interval, and either automatic key detection or a manually
// chosen key. Jobs are serde types, so a job can also be stored as JSON and
// replayed (`ustx-harmony run job.json`).
//
// Automatic key detection listens to the notes of the FIRST selected track
// only; that key is then applied to every selected track. A job may carry
// its own `KeyProfiles` weights for that detection.
//
// See also: `worker.rs`, which runs a job off the calling thread.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ustx_harmony::document::tones;
use ustx_harmony::{
    Document, HarmonyError, HarmonySettings, HarmonyType, Key, KeyProfiles, detect_key_with,
    harmonize, log_top_candidates,
};

use crate::ustx::{UstxError, load_document, save_document};

/// Default harmony interval: a minor third.
pub const DEFAULT_INTERVAL: i64 = 3;

/// Intervals are limited to one octave either way.
pub const MAX_INTERVAL: i64 = 12;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid request: {0}")]
    InvalidJob(String),

    #[error("could not load job file {}: {reason}", path.display())]
    JobFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Ustx(#[from] UstxError),

    #[error(transparent)]
    Harmony(#[from] HarmonyError),
}

/// User-facing classification of a [`JobError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Malformed,
    ReadFailure,
    WriteFailure,
    InvalidKey,
    InvalidRequest,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorCategory::NotFound => "File not found",
            ErrorCategory::Malformed => "Malformed project",
            ErrorCategory::ReadFailure => "Read error",
            ErrorCategory::WriteFailure => "Error saving file",
            ErrorCategory::InvalidKey => "Invalid key",
            ErrorCategory::InvalidRequest => "Invalid request",
        })
    }
}

impl JobError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JobError::InvalidJob(_) | JobError::JobFile { .. } => ErrorCategory::InvalidRequest,
            JobError::Ustx(UstxError::NotFound { .. }) => ErrorCategory::NotFound,
            JobError::Ustx(UstxError::Read { .. }) => ErrorCategory::ReadFailure,
            JobError::Ustx(UstxError::Malformed { .. }) => ErrorCategory::Malformed,
            JobError::Ustx(UstxError::Write { .. }) => ErrorCategory::WriteFailure,
            JobError::Harmony(HarmonyError::InvalidKey(_)) => ErrorCategory::InvalidKey,
            JobError::Harmony(HarmonyError::TrackOutOfRange { .. }) => ErrorCategory::InvalidRequest,
            JobError::Harmony(
                HarmonyError::MalformedDocument(_)
                | HarmonyError::MissingTone { .. }
                | HarmonyError::TrackMissingTone { .. },
            ) => ErrorCategory::Malformed,
        }
    }

    /// One-line message for display: category plus detail.
    pub fn user_message(&self) -> String {
        format!("{}: {self}", self.category())
    }
}

/// How the key for correction is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum KeyChoice {
    /// Detect from the first selected track's notes.
    #[default]
    Auto,
    /// A named key: `name` is a pitch-class name such as `"D"` or
    /// `"F#/Gb"`, `mode` is `"major"` or `"minor"`.
    Manual { name: String, mode: String },
}

/// Where the key used for a job came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    Detected,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Zero-based indices of the source tracks, processed in this order.
    pub tracks: Vec<usize>,
    #[serde(default)]
    pub harmony: HarmonyType,
    #[serde(default = "default_interval")]
    pub interval: i64,
    #[serde(default)]
    pub key: KeyChoice,
    /// Key-detection weights; the built-in Krumhansl-Kessler profiles when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<KeyProfiles>,
}

fn default_interval() -> i64 {
    DEFAULT_INTERVAL
}

/// Result of applying a job to an in-memory document.
#[derive(Debug, Clone, PartialEq)]
pub struct Harmonized {
    pub key: Key,
    pub key_source: KeySource,
    pub new_tracks: Vec<String>,
}

/// Result of a full job run.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub harmonized: Harmonized,
    /// Path actually written (with `.ustx` appended if needed).
    pub written: PathBuf,
}

impl HarmonyJob {
    /// A lower-harmony, auto-key job with the default interval.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, tracks: Vec<usize>) -> Self {
        HarmonyJob {
            input: input.into(),
            output: output.into(),
            tracks,
            harmony: HarmonyType::default(),
            interval: DEFAULT_INTERVAL,
            key: KeyChoice::Auto,
            profiles: None,
        }
    }

    /// Load a job stored as JSON.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let job_file_error = |reason: String| JobError::JobFile {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| job_file_error(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| job_file_error(e.to_string()))
    }

    /// Check the request before touching any file.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.tracks.is_empty() {
            return Err(JobError::InvalidJob("no tracks selected".to_string()));
        }
        if !(-MAX_INTERVAL..=MAX_INTERVAL).contains(&self.interval) {
            return Err(JobError::InvalidJob(format!(
                "interval {} is outside -{MAX_INTERVAL}..={MAX_INTERVAL}",
                self.interval
            )));
        }
        if let KeyChoice::Manual { name, mode } = &self.key {
            Key::from_names(name, mode)?;
        }
        Ok(())
    }

    /// Pick the key for `document` according to `self.key`.
    pub fn resolve_key(&self, document: &Document) -> Result<(Key, KeySource), JobError> {
        match &self.key {
            KeyChoice::Manual { name, mode } => Ok((Key::from_names(name, mode)?, KeySource::Manual)),
            KeyChoice::Auto => {
                let reference = self
                    .tracks
                    .first()
                    .ok_or_else(|| JobError::InvalidJob("no tracks selected".to_string()))?;
                let notes = document.notes_for_track(*reference)?;
                let tones = tones(&notes).map_err(|e| e.in_track(*reference))?;
                let profiles = self.profiles.clone().unwrap_or_default();
                let detection = detect_key_with(tones, &profiles, log_top_candidates);
                Ok((detection.key, KeySource::Detected))
            }
        }
    }

    /// Validate, choose the key and harmonize `document` in place.
    pub fn apply(&self, document: &mut Document) -> Result<Harmonized, JobError> {
        self.validate()?;
        let (key, key_source) = self.resolve_key(document)?;
        log::info!("Using key {key} ({key_source:?})");
        let settings = HarmonySettings {
            harmony_type: self.harmony,
            semitone_interval: self.interval,
            key,
        };
        let new_tracks = harmonize(document, &self.tracks, &settings)?;
        Ok(Harmonized {
            key,
            key_source,
            new_tracks,
        })
    }

    /// Load the input, harmonize it and write the output.
    pub fn run(&self) -> Result<JobOutcome, JobError> {
        self.validate()?;
        log::info!(
            "Harmony job: {} -> {}, tracks {:?}",
            self.input.display(),
            self.output.display(),
            self.tracks
        );
        let mut document = load_document(&self.input)?;
        let harmonized = self.apply(&mut document)?;
        let written = save_document(&document, &self.output)?;
        log::info!(
            "Wrote {} new track(s) to {}",
            harmonized.new_tracks.len(),
            written.display()
        );
        Ok(JobOutcome {
            harmonized,
            written,
        })
    }
}
