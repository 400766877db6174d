// ustx-harmony: command-line front end.
//
// Adds harmony tracks to a USTX project. Each selected track's melody is
// shifted by an interval and corrected into a key (detected from the first
// selected track, or given with --key/--mode), and the result is written to
// a new project file.
//
// Usage:
//   ustx-harmony tracks <INPUT>
//   ustx-harmony detect-key <INPUT> [--track N] [--profiles PROFILES.json]
//   ustx-harmony harmonize <INPUT> <OUTPUT> --track N [--track N ...]
//     [--harmony lower|upper|both] [--interval SEMITONES] [--key NAME --mode MODE]
//     [--profiles PROFILES.json]
//   ustx-harmony run <JOB.json>
//
// Set RUST_LOG=debug to see the key-detection ranking and per-track detail.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ustx_harmony::document::tones;
use ustx_harmony::{HarmonyType, KEY_NAMES, KeyProfiles, detect_key_with};
use ustx_harmony_app::job::DEFAULT_INTERVAL;
use ustx_harmony_app::{HarmonyJob, JobOutcome, KeyChoice, KeySource, load_document};

/// Harmony track generator for USTX projects
#[derive(Parser)]
#[command(name = "ustx-harmony")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tracks of a project
    Tracks {
        /// Input project (.ustx is appended if missing)
        input: PathBuf,
    },
    /// Detect the key of one track
    DetectKey {
        input: PathBuf,

        /// Zero-based track index
        #[arg(short, long, default_value_t = 0)]
        track: usize,

        /// JSON file with custom `major`/`minor` key-detection weights
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Add harmony tracks and write a new project
    Harmonize {
        input: PathBuf,
        output: PathBuf,

        /// Zero-based source track index; repeat for several tracks
        #[arg(short, long = "track", required = true)]
        tracks: Vec<usize>,

        /// Which harmonies to create: lower, upper or both
        #[arg(long, default_value = "lower")]
        harmony: HarmonyType,

        /// Interval in semitones (-12..=12)
        #[arg(short, long, default_value_t = DEFAULT_INTERVAL, allow_negative_numbers = true)]
        interval: i64,

        /// Manual key name (e.g. "D", "F#/Gb", "Bb"); detected when omitted
        #[arg(long, requires = "mode")]
        key: Option<String>,

        /// Manual key mode: major or minor
        #[arg(long, requires = "key")]
        mode: Option<String>,

        /// JSON file with custom `major`/`minor` key-detection weights
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Run a job stored as JSON
    Run {
        job: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tracks { input } => list_tracks(&input),
        Commands::DetectKey {
            input,
            track,
            profiles,
        } => detect(&input, track, profiles.as_deref()),
        Commands::Harmonize {
            input,
            output,
            tracks,
            harmony,
            interval,
            key,
            mode,
            profiles,
        } => {
            let key = match (key, mode) {
                (Some(name), Some(mode)) => KeyChoice::Manual { name, mode },
                _ => KeyChoice::Auto,
            };
            let profiles = match profiles {
                Some(path) => Some(load_profiles(&path)?),
                None => None,
            };
            let job = HarmonyJob {
                harmony,
                interval,
                key,
                profiles,
                ..HarmonyJob::new(input, output, tracks)
            };
            run_job(&job)
        }
        Commands::Run { job } => {
            let job = HarmonyJob::load(&job)?;
            run_job(&job)
        }
    }
}

fn list_tracks(input: &Path) -> Result<()> {
    let document = load_document(input)?;
    let names = document
        .track_names()
        .with_context(|| format!("reading tracks of {}", input.display()))?;
    if names.is_empty() {
        println!("No tracks.");
    }
    for (i, name) in names.iter().enumerate() {
        let notes = document.notes_for_track(i)?.len();
        println!("{i:>3}  {name} ({notes} notes)");
    }
    Ok(())
}

fn load_profiles(path: &Path) -> Result<KeyProfiles> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading key profiles {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing key profiles {}", path.display()))
}

fn detect(input: &Path, track: usize, profiles: Option<&Path>) -> Result<()> {
    let profiles = match profiles {
        Some(path) => load_profiles(path)?,
        None => KeyProfiles::default(),
    };
    let document = load_document(input)?;
    let notes = document.notes_for_track(track)?;
    let tones = tones(&notes)
        .map_err(|e| e.in_track(track))
        .with_context(|| format!("detecting key of track {track}"))?;
    // Ranking is printed below.
    let detection = detect_key_with(tones, &profiles, |_| {});

    println!("Track {track}: {} notes", notes.len());
    println!("Key: {}", detection.key);
    if !detection.ranking.is_empty() {
        println!("Top candidates:");
        for candidate in detection.top(5) {
            println!("  {:<12} {:.2}", candidate.key.to_string(), candidate.score);
        }
    }
    Ok(())
}

fn run_job(job: &HarmonyJob) -> Result<()> {
    let JobOutcome {
        harmonized,
        written,
    } = job.run().map_err(|e| {
        let hint = match e.category() {
            ustx_harmony_app::ErrorCategory::InvalidKey => {
                format!(" (key names: {})", KEY_NAMES.join(", "))
            }
            _ => String::new(),
        };
        anyhow::anyhow!("{}{hint}", e.user_message())
    })?;

    let source = match harmonized.key_source {
        KeySource::Detected => "detected",
        KeySource::Manual => "manual",
    };
    println!("Key: {} ({source})", harmonized.key);
    for name in &harmonized.new_tracks {
        println!("  + {name}");
    }
    println!("Wrote {}", written.display());
    Ok(())
}
