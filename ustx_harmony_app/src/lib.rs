// USTX harmony application layer.
//
// Everything around the pure `ustx_harmony` core that touches the outside
// world: project files, job requests, a background worker, and the
// `ustx-harmony` command-line tool (src/main.rs).
//
// Module overview:
// - `ustx.rs`:   `.ustx` (YAML) load/save with not-found / malformed /
//                write-failure errors kept distinct.
// - `job.rs`:    `HarmonyJob`, the full load -> key -> harmonize -> save
//                request, loadable from JSON.
// - `worker.rs`: Runs a job on its own thread with a completion callback.

pub mod job;
pub mod ustx;
pub mod worker;

pub use job::{ErrorCategory, HarmonyJob, Harmonized, JobError, JobOutcome, KeyChoice, KeySource};
pub use ustx::{UstxError, load_document, parse_document, render_document, resolve_ustx_path, save_document};
pub use worker::spawn_job;
