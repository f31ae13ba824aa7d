//! Phase/stage pipeline runner: a fixed ordered sequence of phases grouped
//! into four stages, scheduled onto parallel tracks where their declared
//! reads/writes allow it, with per-phase timeouts, failure isolation, and
//! an observer event stream (spec §4.9, §5).

pub mod context;
pub mod error;
pub mod phase;
pub mod phases;
pub mod runner;
pub mod scheduler;
pub mod stage;

pub use context::PhaseContext;
pub use error::PipelineError;
pub use phase::{
    resolve_timeout, PhaseError, PhaseOperation, PhaseOutcome, TaskStatus, DEFAULT_COMPILE_CHECK_TIMEOUT,
    DEFAULT_FCE_TIMEOUT, DEFAULT_LINTER_TIMEOUT, TIMEOUT_OVERRIDE_ENV,
};
pub use runner::{PhaseResult, PipelineReport, Runner};
pub use stage::{Stage, STAGE_NAMES};

use crate::observer::{NullObserver, Observer};
use crate::store::Store;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Assembles the fixed stage inventory and drives it to completion against
/// `root`, using `store` for all phase reads/writes. This is the entry
/// point the CLI's `full`/`index`/`lint`/... subcommands all funnel into,
/// each simply passing a different observer or a pre-filtered stage list.
#[must_use]
pub fn run_full(root: &Path, store: Arc<Store>, observer: Arc<dyn Observer>, offline: bool) -> PipelineReport {
    let cancel = Arc::new(AtomicBool::new(false));
    let ctx = PhaseContext::new(root.to_string_lossy().into_owned(), store, cancel, offline);
    let runner = Runner::new(observer);
    runner.run(&phases::build_stages(), &ctx)
}

/// Same as [`run_full`] but with a [`NullObserver`], for callers that only
/// want the final report (tests, `--quiet` runs).
#[must_use]
pub fn run_full_quiet(root: &Path, store: Arc<Store>, offline: bool) -> PipelineReport {
    run_full(root, store, Arc::new(NullObserver), offline)
}
