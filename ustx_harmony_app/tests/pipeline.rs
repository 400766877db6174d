// End-to-end tests for harmony jobs.
//
// Each test writes a small USTX project to its own directory under the
// system temp dir, runs a job against it (directly or through the worker),
// and reads the written project back to check the new tracks, voice parts,
// and that everything else survived the round trip.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

use serde_json::json;
use ustx_harmony::document::tones;
use ustx_harmony::{HarmonyType, Key, Mode};
use ustx_harmony_app::{
    ErrorCategory, HarmonyJob, KeyChoice, KeySource, load_document, spawn_job,
};

const PROJECT: &str = "\
name: Round
comment: test project
output_dir: Vocal
cache_dir: UCache
ustx_version: '0.6'
resolution: 480
bpm: 100
beat_per_bar: 4
beat_unit: 4
expressions:
  vel:
    name: velocity
    abbr: vel
    type: Numerical
    min: 0
    max: 200
    default_value: 100
tracks:
- singer: Teto
  phonemizer: OpenUtau.Core.DefaultPhonemizer
  renderer_settings:
    renderer: CLASSIC
  track_name: Soprano
  track_color: Blue
  mute: false
  solo: false
  volume: 0
- singer: Teto
  track_name: Alto
voice_parts:
- duration: 3840
  name: Soprano Part
  comment: ''
  track_no: 0
  position: 0
  notes:
  - position: 0
    duration: 480
    tone: 72
    lyric: la
    pitch:
      data:
      - {x: -25, y: 0, shape: io}
      snap_first: true
    vibrato: {length: 0, period: 175, depth: 25}
  - position: 480
    duration: 480
    tone: 76
    lyric: li
  - position: 960
    duration: 960
    tone: 79
    lyric: lu
  curves: []
- duration: 1920
  name: Alto Part
  comment: ''
  track_no: 1
  position: 0
  notes:
  - position: 0
    duration: 1920
    tone: 64
    lyric: oo
  curves: []
- duration: 960
  name: Soprano Coda
  comment: ''
  track_no: 0
  position: 1920
  notes:
  - position: 0
    duration: 960
    tone: 84
    lyric: ah
  curves: []
wave_parts: []
";

/// Fresh directory holding `input.ustx`.
fn workspace(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ustx_harmony_{test}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("input.ustx"), PROJECT).unwrap();
    dir
}

#[test]
fn both_harmonies_round_trip_through_files() {
    let dir = workspace("both");
    let job = HarmonyJob {
        harmony: HarmonyType::Both,
        ..HarmonyJob::new(dir.join("input"), dir.join("output"), vec![0])
    };
    let outcome = job.run().unwrap();

    assert_eq!(outcome.written, dir.join("output.ustx"));
    assert_eq!(outcome.harmonized.key, Key::new(0, Mode::Major));
    assert_eq!(outcome.harmonized.key_source, KeySource::Detected);
    assert_eq!(
        outcome.harmonized.new_tracks,
        vec!["Soprano - Lower Harmony", "Soprano - Upper Harmony"]
    );

    let original = load_document(&dir.join("input")).unwrap();
    let written = load_document(&outcome.written).unwrap();

    // Untouched top-level content, in the same order.
    let keys: Vec<&String> = written.fields().keys().collect();
    let original_keys: Vec<&String> = original.fields().keys().collect();
    assert_eq!(keys, original_keys);
    assert_eq!(written.fields()["expressions"], original.fields()["expressions"]);
    assert_eq!(written.fields()["ustx_version"], json!("0.6"));

    let tracks = written.tracks().unwrap();
    assert_eq!(tracks.len(), 4);
    assert_eq!(tracks[..2], original.tracks().unwrap()[..]);
    assert_eq!(tracks[2].fields()["renderer_settings"], json!({"renderer": "CLASSIC"}));
    assert_eq!(tracks[3].name(), Some("Soprano - Upper Harmony"));

    let parts = written.voice_parts().unwrap();
    assert_eq!(parts.len(), 5);
    assert_eq!(parts[..3], original.voice_parts().unwrap()[..]);
    assert_eq!(parts[3].track_no().unwrap(), 2);
    assert_eq!(parts[4].track_no().unwrap(), 3);
    assert_eq!(parts[3].duration(), Some(&json!(3840)));

    // Soprano: 72 76 79 84 in C major, a minor third away.
    // Lower: 69, 73->74, 76, 81. Upper: 75->74, 79, 82->81, 87->86.
    let lower = parts[3].notes().unwrap();
    assert_eq!(tones(&lower).unwrap(), vec![69, 74, 76, 81]);
    assert_eq!(tones(&parts[4].notes().unwrap()).unwrap(), vec![74, 79, 81, 86]);
    assert_eq!(lower[0].fields()["vibrato"], json!({"length": 0, "period": 175, "depth": 25}));
    assert_eq!(lower[0].fields()["pitch"]["snap_first"], json!(true));
    assert_eq!(lower[3].fields()["lyric"], json!("ah"));

    // Written again from the reloaded document, the file is byte-identical.
    let rendered = ustx_harmony_app::render_document(&written).unwrap();
    assert_eq!(rendered, fs::read_to_string(&outcome.written).unwrap());
}

#[test]
fn manual_key_and_job_file() {
    let dir = workspace("manual");
    let job_path = dir.join("job.json");
    let job = HarmonyJob {
        harmony: HarmonyType::UpperOnly,
        interval: 4,
        key: KeyChoice::Manual {
            name: "A".into(),
            mode: "minor".into(),
        },
        ..HarmonyJob::new(dir.join("input.ustx"), dir.join("out.ustx"), vec![1, 0])
    };
    fs::write(&job_path, serde_json::to_string_pretty(&job).unwrap()).unwrap();

    let loaded = HarmonyJob::load(&job_path).unwrap();
    assert_eq!(loaded, job);
    let outcome = loaded.run().unwrap();
    assert_eq!(outcome.harmonized.key, Key::new(9, Mode::Minor));
    assert_eq!(outcome.harmonized.key_source, KeySource::Manual);

    let written = load_document(&dir.join("out")).unwrap();
    assert_eq!(
        written.track_names().unwrap(),
        vec!["Soprano", "Alto", "Alto - Upper Harmony", "Soprano - Upper Harmony"]
    );
    let parts = written.voice_parts().unwrap();
    // Alto 64 + 4 = 68 (G#), corrected down to G in A minor.
    assert_eq!(tones(&parts[3].notes().unwrap()).unwrap(), vec![67]);
    assert_eq!(parts[3].track_no().unwrap(), 2);
    assert_eq!(parts[4].track_no().unwrap(), 3);
}

#[test]
fn error_categories_for_files() {
    let dir = workspace("errors");

    let missing = HarmonyJob::new(dir.join("nope"), dir.join("out"), vec![0]);
    assert_eq!(missing.run().unwrap_err().category(), ErrorCategory::NotFound);

    fs::write(dir.join("broken.ustx"), "tracks: [\n  - {").unwrap();
    let broken = HarmonyJob::new(dir.join("broken"), dir.join("out"), vec![0]);
    assert_eq!(broken.run().unwrap_err().category(), ErrorCategory::Malformed);

    // Output inside a directory that does not exist.
    let unwritable = HarmonyJob::new(dir.join("input"), dir.join("no_such_dir").join("out"), vec![0]);
    assert_eq!(unwritable.run().unwrap_err().category(), ErrorCategory::WriteFailure);

    let bad_key = HarmonyJob {
        key: KeyChoice::Manual {
            name: "Z".into(),
            mode: "major".into(),
        },
        ..HarmonyJob::new(dir.join("input"), dir.join("out"), vec![0])
    };
    let err = bad_key.run().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidKey);
    assert!(!dir.join("out.ustx").exists());
}

#[test]
fn worker_reports_completion_once() {
    let dir = workspace("worker");
    let job = HarmonyJob::new(dir.join("input"), dir.join("bg"), vec![1]);
    let (tx, rx) = mpsc::channel();
    let handle = spawn_job(job, move |result| tx.send(result).unwrap()).unwrap();
    handle.join().unwrap();

    let outcome = rx.recv().unwrap().unwrap();
    assert_eq!(outcome.harmonized.new_tracks, vec!["Alto - Lower Harmony"]);
    assert!(outcome.written.exists());
    // The sender was consumed by the single callback.
    assert!(rx.recv().is_err());
}
