//! Durable failure diagnostics: `.pf/error.log` for human-readable tracebacks
//! and `.pf/journal.ndjson` for a structured, replayable record of every
//! pipeline event. Both are append-only, so a run never destroys evidence
//! from a previous one.

use crate::observer::Observer;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("failed to open {path}: {source}")]
    OpenFile { path: PathBuf, source: std::io::Error },
    #[error("failed to write to {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

const BANNER: &str = "================================================================================";

/// Appends an 80-`=` banner, the failing command's name, and the error's
/// display chain (via `source()`) to `<pf_dir>/error.log`. Grounded on the
/// original `handle_exceptions` decorator's traceback dump, minus the
/// Python-specific stack frames a Rust `Error` chain doesn't carry.
pub fn log_error(
    pf_dir: &Path,
    command: &str,
    error: &(dyn std::error::Error + 'static),
) -> Result<(), DiagnosticsError> {
    fs::create_dir_all(pf_dir)
        .map_err(|source| DiagnosticsError::CreateDir { path: pf_dir.to_path_buf(), source })?;
    let path = pf_dir.join("error.log");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| DiagnosticsError::OpenFile { path: path.clone(), source })?;

    let mut body = format!("\n{BANNER}\nError in command: {command}\n{BANNER}\n{error}\n");
    let mut cause = error.source();
    while let Some(err) = cause {
        body.push_str(&format!("Caused by: {err}\n"));
        cause = err.source();
    }
    body.push_str(&format!("{BANNER}\n\n"));

    file.write_all(body.as_bytes())
        .map_err(|source| DiagnosticsError::Write { path, source })
}

/// One line of `.pf/journal.ndjson`: every `Observer` callback, tagged by
/// kind, with a millisecond Unix timestamp. Kept deliberately flat so a
/// consumer can `jq` the file without first understanding a nested schema.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JournalEvent<'a> {
    StageStart { timestamp_ms: u128, stage_name: &'a str, stage_num: usize },
    PhaseStart { timestamp_ms: u128, name: &'a str, index: usize, total: usize },
    PhaseComplete { timestamp_ms: u128, name: &'a str, elapsed_ms: u128 },
    PhaseFailed { timestamp_ms: u128, name: &'a str, error: &'a str, exit_code: i32 },
    ParallelTrackStart { timestamp_ms: u128, track: &'a str },
    ParallelTrackComplete { timestamp_ms: u128, track: &'a str, elapsed_ms: u128 },
    Log { timestamp_ms: u128, message: &'a str, is_error: bool },
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

/// An `Observer` that appends a newline-delimited JSON record of every
/// event to `<pf_dir>/journal.ndjson`, for post-hoc inspection of a run
/// independent of whatever the console showed at the time. A malformed
/// write is dropped rather than propagated: per the observer contract,
/// journaling failures must never take down the pipeline they're recording.
pub struct JournalObserver {
    file: Mutex<File>,
}

impl JournalObserver {
    /// Opens (creating if necessary) `<pf_dir>/journal.ndjson` for append.
    pub fn open(pf_dir: &Path) -> Result<Self, DiagnosticsError> {
        fs::create_dir_all(pf_dir)
            .map_err(|source| DiagnosticsError::CreateDir { path: pf_dir.to_path_buf(), source })?;
        let path = pf_dir.join("journal.ndjson");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| DiagnosticsError::OpenFile { path, source })?;
        Ok(Self { file: Mutex::new(file) })
    }

    fn append(&self, event: &JournalEvent<'_>) {
        let Ok(mut line) = serde_json::to_string(event) else { return };
        line.push('\n');
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

impl Observer for JournalObserver {
    fn on_stage_start(&self, stage_name: &str, stage_num: usize) {
        self.append(&JournalEvent::StageStart { timestamp_ms: now_millis(), stage_name, stage_num });
    }

    fn on_phase_start(&self, name: &str, index: usize, total: usize) {
        self.append(&JournalEvent::PhaseStart { timestamp_ms: now_millis(), name, index, total });
    }

    fn on_phase_complete(&self, name: &str, elapsed: Duration) {
        self.append(&JournalEvent::PhaseComplete {
            timestamp_ms: now_millis(),
            name,
            elapsed_ms: elapsed.as_millis(),
        });
    }

    fn on_phase_failed(&self, name: &str, error: &str, exit_code: i32) {
        self.append(&JournalEvent::PhaseFailed { timestamp_ms: now_millis(), name, error, exit_code });
    }

    fn on_parallel_track_start(&self, track: &str) {
        self.append(&JournalEvent::ParallelTrackStart { timestamp_ms: now_millis(), track });
    }

    fn on_parallel_track_complete(&self, track: &str, elapsed: Duration) {
        self.append(&JournalEvent::ParallelTrackComplete {
            timestamp_ms: now_millis(),
            track,
            elapsed_ms: elapsed.as_millis(),
        });
    }

    fn on_log(&self, message: &str, is_error: bool) {
        self.append(&JournalEvent::Log { timestamp_ms: now_millis(), message, is_error });
    }
}

/// Broadcasts every event to a fixed list of observers, so a caller can run
/// the console observer and the journal observer off the same event stream
/// without the runner knowing either exists.
pub struct FanoutObserver {
    observers: Vec<Box<dyn Observer>>,
}

impl FanoutObserver {
    #[must_use]
    pub fn new(observers: Vec<Box<dyn Observer>>) -> Self {
        Self { observers }
    }
}

impl Observer for FanoutObserver {
    fn on_stage_start(&self, stage_name: &str, stage_num: usize) {
        for o in &self.observers {
            o.on_stage_start(stage_name, stage_num);
        }
    }

    fn on_phase_start(&self, name: &str, index: usize, total: usize) {
        for o in &self.observers {
            o.on_phase_start(name, index, total);
        }
    }

    fn on_phase_complete(&self, name: &str, elapsed: Duration) {
        for o in &self.observers {
            o.on_phase_complete(name, elapsed);
        }
    }

    fn on_phase_failed(&self, name: &str, error: &str, exit_code: i32) {
        for o in &self.observers {
            o.on_phase_failed(name, error, exit_code);
        }
    }

    fn on_parallel_track_start(&self, track: &str) {
        for o in &self.observers {
            o.on_parallel_track_start(track);
        }
    }

    fn on_parallel_track_complete(&self, track: &str, elapsed: Duration) {
        for o in &self.observers {
            o.on_parallel_track_complete(track, elapsed);
        }
    }

    fn on_log(&self, message: &str, is_error: bool) {
        for o in &self.observers {
            o.on_log(message, is_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use std::fmt;

    #[derive(Debug)]
    struct BoomError;
    impl fmt::Display for BoomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }
    impl std::error::Error for BoomError {}

    #[test]
    fn log_error_appends_banner_and_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        log_error(dir.path(), "analyze", &BoomError).expect("log_error");
        let contents = fs::read_to_string(dir.path().join("error.log")).expect("read");
        assert!(contents.contains("Error in command: analyze"));
        assert!(contents.contains("boom"));
        assert!(contents.contains(BANNER));
    }

    #[test]
    fn journal_observer_writes_one_ndjson_line_per_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalObserver::open(dir.path()).expect("open");
        journal.on_stage_start("Index & detect", 1);
        journal.on_phase_complete("framework_detect", Duration::from_millis(50));

        let contents = fs::read_to_string(dir.path().join("journal.ndjson")).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line).expect("valid json line");
        }
    }

    #[test]
    fn fanout_observer_forwards_to_every_child() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = JournalObserver::open(dir.path()).expect("open");
        let fanout = FanoutObserver::new(vec![Box::new(NullObserver), Box::new(journal)]);
        fanout.on_phase_start("lint", 0, 2);
        let contents = fs::read_to_string(dir.path().join("journal.ndjson")).expect("read");
        assert_eq!(contents.lines().count(), 1);
    }
}
