//! Polling watch loop: sleep, run one reconciliation pass, report, repeat.
//!
//! Single-threaded and cooperative. The sleep is the only suspension point;
//! a stop request takes effect at the next wake, never mid-pass, so a pass
//! always runs to completion once started. A pass that fails entirely
//! (store unreachable, lock held by a manual run) is logged and the loop
//! keeps going.

use super::{PassSummary, SyncEngine};
use crate::error::Result;
use crate::store::NoteStore;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::error;

/// Granularity of the cancellation check while sleeping.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Run reconciliation passes on `interval` until `stop` is set. Each pass
/// outcome is handed to `on_pass`. Returns the number of passes run.
pub fn run<S, F>(
    store: &mut S,
    root: &Path,
    default_folder: &str,
    interval: Duration,
    stop: &AtomicBool,
    mut on_pass: F,
) -> usize
where
    S: NoteStore,
    F: FnMut(&Result<PassSummary>),
{
    let mut passes = 0;
    loop {
        if sleep_until_stopped(interval, stop) {
            return passes;
        }

        let mut engine =
            SyncEngine::new(store, root.to_path_buf(), default_folder.to_string());
        let outcome = engine.run_pass();
        passes += 1;
        if let Err(e) = &outcome {
            error!(error = %e, "sync pass failed, retrying next interval");
        }
        on_pass(&outcome);
    }
}

/// Sleep for `interval`, waking early when `stop` is set. Returns true when
/// stopped.
fn sleep_until_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::Relaxed) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
