//! Observer interface for pipeline progress events, plus a console
//! implementation backed by `indicatif`. Observers are consulted from the
//! runner's single event thread and must never raise — the runner never
//! depends on an observer's outcome, only on its side effects (logging,
//! drawing a progress bar).

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Pipeline progress events. Implementations must not panic; a panicking
/// observer would take down the runner's event thread along with every
/// in-flight phase.
pub trait Observer: Send + Sync {
    fn on_stage_start(&self, stage_name: &str, stage_num: usize) {
        let _ = (stage_name, stage_num);
    }
    fn on_phase_start(&self, name: &str, index: usize, total: usize) {
        let _ = (name, index, total);
    }
    fn on_phase_complete(&self, name: &str, elapsed: Duration) {
        let _ = (name, elapsed);
    }
    fn on_phase_failed(&self, name: &str, error: &str, exit_code: i32) {
        let _ = (name, error, exit_code);
    }
    fn on_parallel_track_start(&self, track: &str) {
        let _ = track;
    }
    fn on_parallel_track_complete(&self, track: &str, elapsed: Duration) {
        let _ = (track, elapsed);
    }
    fn on_log(&self, message: &str, is_error: bool) {
        let _ = (message, is_error);
    }
}

/// An observer that does nothing, for offline/library callers that don't
/// want console output (e.g. tests, or `--quiet`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// The default observer: a log line per event plus a live `indicatif`
/// progress bar tracking phase completion within the current stage.
pub struct ConsoleObserver {
    multi: MultiProgress,
    current_stage: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ConsoleObserver {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { multi: MultiProgress::new(), current_stage: Mutex::new(None), quiet }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Observer for ConsoleObserver {
    fn on_stage_start(&self, stage_name: &str, stage_num: usize) {
        if self.quiet {
            return;
        }
        let bar = self.multi.add(ProgressBar::new(0));
        bar.set_style(Self::bar_style());
        bar.set_message(format!("stage {stage_num}: {stage_name}"));
        *self.current_stage.lock().expect("observer mutex poisoned") = Some(bar);
    }

    fn on_phase_start(&self, name: &str, index: usize, total: usize) {
        if self.quiet {
            return;
        }
        let guard = self.current_stage.lock().expect("observer mutex poisoned");
        if let Some(bar) = guard.as_ref() {
            bar.set_length(total as u64);
            bar.set_position(index as u64);
            bar.set_message(format!("running {name}"));
        }
    }

    fn on_phase_complete(&self, name: &str, elapsed: Duration) {
        if self.quiet {
            return;
        }
        self.on_log(&format!("{name} completed in {:.2}s", elapsed.as_secs_f64()), false);
    }

    fn on_phase_failed(&self, name: &str, error: &str, exit_code: i32) {
        self.on_log(&format!("{name} failed (exit {exit_code}): {error}"), true);
    }

    fn on_parallel_track_start(&self, track: &str) {
        if !self.quiet {
            self.on_log(&format!("track '{track}' started"), false);
        }
    }

    fn on_parallel_track_complete(&self, track: &str, elapsed: Duration) {
        if !self.quiet {
            self.on_log(&format!("track '{track}' completed in {:.2}s", elapsed.as_secs_f64()), false);
        }
    }

    fn on_log(&self, message: &str, is_error: bool) {
        if is_error {
            self.multi.suspend(|| eprintln!("[ERROR] {message}"));
        } else if !self.quiet {
            self.multi.suspend(|| println!("{message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_observer_never_panics_on_any_event() {
        let observer = NullObserver;
        observer.on_stage_start("index", 1);
        observer.on_phase_start("lint", 0, 3);
        observer.on_phase_complete("lint", Duration::from_secs(1));
        observer.on_phase_failed("lint", "boom", 124);
        observer.on_parallel_track_start("analyze");
        observer.on_parallel_track_complete("analyze", Duration::from_millis(10));
        observer.on_log("hello", false);
    }

    #[test]
    fn console_observer_quiet_mode_suppresses_bars() {
        let observer = ConsoleObserver::new(true);
        observer.on_stage_start("index", 1);
        assert!(observer.current_stage.lock().expect("lock").is_none());
    }
}
