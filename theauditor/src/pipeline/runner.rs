//! Executes a fixed ordered sequence of stages, each a set of phases
//! scheduled onto parallel tracks per `super::scheduler`, emitting observer
//! events and rolling up a `PhaseResult` per phase.

use super::context::PhaseContext;
use super::phase::{PhaseOperation, TaskStatus};
use super::scheduler;
use super::stage::Stage;
use crate::observer::{NullObserver, Observer};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One phase's final disposition, matching the `(name, status, elapsed,
/// stdout, stderr, exit_code, findings_count)` shape of spec §4.9.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PhaseResult {
    pub name: String,
    pub status: TaskStatus,
    pub elapsed_secs: f64,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub findings_count: usize,
}

impl PhaseResult {
    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: TaskStatus::Skipped,
            elapsed_secs: 0.0,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            findings_count: 0,
        }
    }
}

/// The ordered list of every phase's result plus a roll-up the CLI uses to
/// pick an exit code (spec §6: highest recorded severity, unless a
/// non-recoverable error forced an earlier abort).
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineReport {
    pub results: Vec<PhaseResult>,
}

impl PipelineReport {
    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.results.iter().any(|r| matches!(r.status, TaskStatus::Failed | TaskStatus::TimedOut))
    }

    #[must_use]
    pub fn failed_phase_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, TaskStatus::Failed | TaskStatus::TimedOut))
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Drives stages to completion. Single-threaded itself (per spec §5 — "the
/// pipeline runner itself is single-threaded"); it dispatches phases to a
/// worker per parallel track via `std::thread::scope` and waits for them.
pub struct Runner {
    observer: Arc<dyn Observer>,
    cancel: Arc<AtomicBool>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Arc::new(NullObserver))
    }
}

impl Runner {
    #[must_use]
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self { observer, cancel: Arc::new(AtomicBool::new(false)) }
    }

    /// The flag Ctrl-C handling should flip; every in-flight phase observes
    /// it via its `PhaseContext`.
    #[must_use]
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Runs every stage in order. Stops starting new stages (but lets the
    /// current one drain) once a stage reports every phase failed or the
    /// cancellation token is set before the stage begins.
    pub fn run(&self, stages: &[Stage], ctx: &PhaseContext) -> PipelineReport {
        let mut results: Vec<PhaseResult> = Vec::new();
        let mut failed_outputs: HashSet<&'static str> = HashSet::new();

        for stage in stages {
            if self.cancel.load(Ordering::SeqCst) {
                for phase in &stage.phases {
                    results.push(PhaseResult::skipped(phase.name()));
                }
                continue;
            }

            self.observer.on_stage_start(stage.name, stage.number);
            let tracks = scheduler::plan_tracks(&stage.phases);
            let track_outcomes = self.run_stage_tracks(stage, &tracks, ctx, &failed_outputs);

            for (local_results, newly_failed) in track_outcomes {
                results.extend(local_results);
                failed_outputs.extend(newly_failed);
            }
        }

        PipelineReport { results }
    }

    fn run_stage_tracks(
        &self,
        stage: &Stage,
        tracks: &[Vec<usize>],
        ctx: &PhaseContext,
        failed_outputs: &HashSet<&'static str>,
    ) -> Vec<(Vec<PhaseResult>, HashSet<&'static str>)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = tracks
                .iter()
                .map(|track| {
                    let track_label =
                        track.iter().map(|&i| stage.phases[i].name()).collect::<Vec<_>>().join("+");
                    self.observer.on_parallel_track_start(&track_label);
                    let track_started = Instant::now();
                    scope.spawn(move || {
                        let outcome = self.run_track(stage, track.as_slice(), ctx, failed_outputs);
                        self.observer.on_parallel_track_complete(&track_label, track_started.elapsed());
                        outcome
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("phase track thread panicked")).collect()
        })
    }

    fn run_track(
        &self,
        stage: &Stage,
        track: &[usize],
        ctx: &PhaseContext,
        failed_outputs: &HashSet<&'static str>,
    ) -> (Vec<PhaseResult>, HashSet<&'static str>) {
        let mut local_results = Vec::new();
        let mut newly_failed: HashSet<&'static str> = HashSet::new();

        for (pos, &idx) in track.iter().enumerate() {
            let phase = stage.phases[idx].as_ref();

            let blocked = phase
                .reads()
                .iter()
                .any(|table| failed_outputs.contains(table) || newly_failed.contains(table));
            if blocked {
                self.observer.on_log(
                    &format!("{} skipped: an upstream dependency failed", phase.name()),
                    true,
                );
                local_results.push(PhaseResult::skipped(phase.name()));
                newly_failed.extend(phase.writes().iter().copied());
                continue;
            }

            self.observer.on_phase_start(phase.name(), pos, track.len());
            let result = self.run_one(phase, ctx);
            match result.status {
                TaskStatus::Success => self.observer.on_phase_complete(
                    phase.name(),
                    std::time::Duration::from_secs_f64(result.elapsed_secs),
                ),
                TaskStatus::Failed | TaskStatus::TimedOut => {
                    self.observer.on_phase_failed(phase.name(), &result.stderr, result.exit_code);
                    newly_failed.extend(phase.writes().iter().copied());
                }
                TaskStatus::Skipped => {}
            }
            local_results.push(result);
        }

        (local_results, newly_failed)
    }

    /// Runs a single phase under its declared timeout. The timeout watcher
    /// can only ask the phase to stop (via `ctx.cancelled()`); a phase that
    /// ignores the request keeps running until it returns on its own, at
    /// which point its result is overridden to `TimedOut` regardless of
    /// what it produced.
    fn run_one(&self, phase: &dyn PhaseOperation, ctx: &PhaseContext) -> PhaseResult {
        let (forked_ctx, deadline_flag) = ctx.fork_for_phase();
        let watchdog_flag = Arc::clone(&deadline_flag);
        let timeout = phase.timeout();
        let started = Instant::now();

        // The watchdog blocks on a channel receive with `timeout`, not a
        // plain sleep: once the phase returns, dropping `done_tx` wakes it
        // immediately (Disconnected) instead of making every fast phase
        // wait out its full timeout before `run_one` can return.
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let outcome = std::thread::scope(|scope| {
            let watchdog = scope.spawn(move || {
                if matches!(done_rx.recv_timeout(timeout), Err(std::sync::mpsc::RecvTimeoutError::Timeout)) {
                    watchdog_flag.store(true, Ordering::SeqCst);
                }
            });
            let run_result = phase.run(&forked_ctx);
            drop(done_tx);
            let _ = watchdog.join();
            run_result
        });

        let elapsed = started.elapsed();
        // `deadline_flag` is this phase's own timeout signal, distinct from
        // `forked_ctx.cancelled()` which also reflects a run-wide Ctrl-C.
        let timed_out = deadline_flag.load(Ordering::SeqCst);

        let (status, stdout, stderr, exit_code, findings_count) = match outcome {
            Ok(o) if timed_out => (TaskStatus::TimedOut, o.stdout, format!("phase timed out after {timeout:?}"), 124, o.findings_count),
            Ok(o) => (TaskStatus::Success, o.stdout, o.stderr, o.exit_code, o.findings_count),
            Err(e) if timed_out => (TaskStatus::TimedOut, String::new(), format!("phase timed out after {timeout:?}: {e}"), 124, 0),
            Err(e) => (TaskStatus::Failed, String::new(), e.message, e.exit_code, 0),
        };

        PhaseResult {
            name: phase.name().to_owned(),
            status,
            elapsed_secs: elapsed.as_secs_f64(),
            stdout,
            stderr,
            exit_code,
            findings_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::phase::{PhaseError, PhaseOutcome};
    use crate::store::Store;
    use std::time::Duration;

    struct Always {
        name: &'static str,
        reads: &'static [&'static str],
        writes: &'static [&'static str],
        outcome: fn() -> Result<PhaseOutcome, PhaseError>,
    }

    impl PhaseOperation for Always {
        fn name(&self) -> &'static str {
            self.name
        }
        fn reads(&self) -> &'static [&'static str] {
            self.reads
        }
        fn writes(&self) -> &'static [&'static str] {
            self.writes
        }
        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
        fn run(&self, _ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
            (self.outcome)()
        }
    }

    fn ctx() -> PhaseContext {
        let store = Arc::new(Store::open_in_memory().expect("open store"));
        PhaseContext::new("/repo", store, Arc::new(AtomicBool::new(false)), true)
    }

    #[test]
    fn successful_phase_reports_success() {
        let runner = Runner::new(Arc::new(NullObserver));
        let phase = Always { name: "index", reads: &[], writes: &["symbols"], outcome: || Ok(PhaseOutcome::default()) };
        let result = runner.run_one(&phase, &ctx());
        assert_eq!(result.status, TaskStatus::Success);
    }

    #[test]
    fn failed_phase_marks_dependents_skipped() {
        let runner = Runner::new(Arc::new(NullObserver));
        let stage = Stage::new(
            "Analyze",
            3,
            vec![
                Box::new(Always {
                    name: "taint",
                    reads: &[],
                    writes: &["taint_flows"],
                    outcome: || Err(PhaseError::new("boom", 1)),
                }),
                Box::new(Always {
                    name: "fce",
                    reads: &["taint_flows"],
                    writes: &["findings_consolidated"],
                    outcome: || Ok(PhaseOutcome::default()),
                }),
            ],
        );
        let report = runner.run(&[stage], &ctx());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].status, TaskStatus::Failed);
        assert_eq!(report.results[1].status, TaskStatus::Skipped);
    }

    #[test]
    fn independent_phase_is_unaffected_by_a_sibling_failure() {
        let runner = Runner::new(Arc::new(NullObserver));
        let stage = Stage::new(
            "Index & detect",
            1,
            vec![
                Box::new(Always {
                    name: "deps",
                    reads: &[],
                    writes: &["dependencies"],
                    outcome: || Err(PhaseError::new("network down", 1)),
                }),
                Box::new(Always {
                    name: "framework_detect",
                    reads: &[],
                    writes: &["framework_records"],
                    outcome: || Ok(PhaseOutcome::default()),
                }),
            ],
        );
        let report = runner.run(&[stage], &ctx());
        let framework_result = report.results.iter().find(|r| r.name == "framework_detect").expect("present");
        assert_eq!(framework_result.status, TaskStatus::Success);
    }

    #[test]
    fn cancellation_before_a_stage_skips_every_phase_in_it() {
        let runner = Runner::new(Arc::new(NullObserver));
        runner.request_cancel();
        let stage = Stage::new(
            "Index & detect",
            1,
            vec![Box::new(Always { name: "index", reads: &[], writes: &["symbols"], outcome: || Ok(PhaseOutcome::default()) })],
        );
        let report = runner.run(&[stage], &ctx());
        assert_eq!(report.results[0].status, TaskStatus::Skipped);
    }

    #[test]
    fn a_phase_that_overruns_its_timeout_is_marked_timed_out() {
        struct Slow;
        impl PhaseOperation for Slow {
            fn name(&self) -> &'static str {
                "slow"
            }
            fn timeout(&self) -> Duration {
                Duration::from_millis(20)
            }
            fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
                let deadline = Instant::now() + Duration::from_millis(200);
                while Instant::now() < deadline && !ctx.cancelled() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(PhaseOutcome::default())
            }
        }
        let runner = Runner::new(Arc::new(NullObserver));
        let result = runner.run_one(&Slow, &ctx());
        assert_eq!(result.status, TaskStatus::TimedOut);
        assert_eq!(result.exit_code, 124);
    }
}
