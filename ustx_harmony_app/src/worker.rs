// Background execution of harmony jobs.
//
// A front end that must stay responsive (an editor plugin, a GUI) hands the
// job to `spawn_job` and gets exactly one callback when it finishes, on the
// worker thread. Errors arrive as a ready-to-display string with the
// category prefix from `JobError::user_message`, so the caller can show it
// without knowing the error types.
//
// The job itself is a single bounded computation plus two file operations;
// there is no cancellation.

use std::io;
use std::thread::{self, JoinHandle};

use crate::job::{HarmonyJob, JobOutcome};

/// Name given to worker threads.
pub const WORKER_THREAD_NAME: &str = "harmony-job";

/// Run `job` on a new thread and report through `on_complete`. Fails only if
/// the thread cannot be created, in which case `on_complete` is never called.
pub fn spawn_job<F>(job: HarmonyJob, on_complete: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce(Result<JobOutcome, String>) + Send + 'static,
{
    thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            let result = job.run().map_err(|e| {
                log::error!("Harmony job for {} failed: {e}", job.input.display());
                e.user_message()
            });
            on_complete(result);
        })
}
