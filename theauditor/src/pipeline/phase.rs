//! The `PhaseOperation` capability: a phase declares what it reads and
//! writes so the scheduler can decide what runs concurrently, and produces
//! a `PhaseResult` the runner can roll up without caring how the phase did
//! its work internally.

use super::context::PhaseContext;
use std::time::Duration;

/// Env var that overrides every phase's default timeout, in whole seconds.
pub const TIMEOUT_OVERRIDE_ENV: &str = "THEAUDITOR_TIMEOUT_SECONDS";

pub const DEFAULT_LINTER_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_FCE_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_COMPILE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads [`TIMEOUT_OVERRIDE_ENV`] once per call; a phase's `timeout()`
/// should fold this in rather than hardcode its default unconditionally.
#[must_use]
pub fn resolve_timeout(default: Duration) -> Duration {
    std::env::var(TIMEOUT_OVERRIDE_ENV)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Final disposition of one phase execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Failed,
    Skipped,
    TimedOut,
}

/// What a phase hands back to the runner on a normal (non-timeout, non-skip)
/// completion. The runner fills in `name`/`status`/`elapsed` itself.
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub findings_count: usize,
}

/// A recoverable failure a phase absorbed into its own outcome rather than
/// propagating — still surfaces to the runner as `TaskStatus::Failed`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PhaseError {
    pub message: String,
    pub exit_code: i32,
}

impl PhaseError {
    #[must_use]
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self { message: message.into(), exit_code }
    }
}

/// One unit of pipeline work. Implementors declare the store tables they
/// read and write; the scheduler uses these lists to decide which phases
/// within a stage may run on parallel tracks (see `super::scheduler`).
pub trait PhaseOperation: Send + Sync {
    /// Stable, human-readable phase name (used in logs and `PhaseResult`).
    fn name(&self) -> &'static str;

    /// Store tables this phase reads. An empty list means the phase has no
    /// store-read dependency on any other phase's output.
    fn reads(&self) -> &'static [&'static str] {
        &[]
    }

    /// Store tables this phase writes.
    fn writes(&self) -> &'static [&'static str] {
        &[]
    }

    /// The phase's timeout, already folded with `THEAUDITOR_TIMEOUT_SECONDS`
    /// if set. Implementors should build this via `resolve_timeout`.
    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    /// Runs the phase to completion. Implementations that wrap a
    /// subprocess must poll `ctx.cancelled()` and kill the child promptly
    /// once it returns true; implementations that are pure in-process work
    /// should check it between units of work where practical. The runner
    /// cannot forcibly preempt a running closure — cooperative cancellation
    /// is the only mechanism Rust gives us for native code.
    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError>;
}
