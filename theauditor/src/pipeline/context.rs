//! Shared, read-mostly state handed to every phase.

use crate::store::Store;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything a phase needs besides its own configuration: the repository
/// root, a handle to the shared store, and a cancellation flag the runner
/// sets once on Ctrl-C or a sibling phase's non-recoverable failure.
pub struct PhaseContext {
    root: PathBuf,
    store: Arc<Store>,
    cancel: Arc<AtomicBool>,
    deadline: Arc<AtomicBool>,
    offline: bool,
}

impl PhaseContext {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, store: Arc<Store>, cancel: Arc<AtomicBool>, offline: bool) -> Self {
        Self { root: root.into(), store, cancel, deadline: Arc::new(AtomicBool::new(false)), offline }
    }

    /// Builds a context identical to `self` but with its own private
    /// deadline flag, so the runner's per-phase timeout watcher can signal
    /// just this one invocation without tripping Ctrl-C-style cancellation
    /// for every other in-flight phase. Returns the flag alongside so the
    /// caller can set it from a watcher thread.
    #[must_use]
    pub fn fork_for_phase(&self) -> (Self, Arc<AtomicBool>) {
        let deadline = Arc::new(AtomicBool::new(false));
        let forked = Self {
            root: self.root.clone(),
            store: Arc::clone(&self.store),
            cancel: Arc::clone(&self.cancel),
            deadline: Arc::clone(&deadline),
            offline: self.offline,
        };
        (forked, deadline)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn offline(&self) -> bool {
        self.offline
    }

    /// True once the runner has asked every in-flight phase to stop.
    /// Subprocess-backed phases must check this and kill their child
    /// promptly; pure in-process phases should check it between units of
    /// work where that's practical.
    /// True if either the run-wide cancellation flag or this phase's own
    /// deadline watcher has fired.
    #[must_use]
    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst) || self.deadline.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn cancelled_reflects_the_shared_flag() {
        let store = Arc::new(Store::open_in_memory().expect("open store"));
        let cancel = Arc::new(AtomicBool::new(false));
        let ctx = PhaseContext::new("/repo", store, Arc::clone(&cancel), false);
        assert!(!ctx.cancelled());
        cancel.store(true, Ordering::SeqCst);
        assert!(ctx.cancelled());
    }

    #[test]
    fn forked_deadline_does_not_leak_into_the_parent_or_siblings() {
        let store = Arc::new(Store::open_in_memory().expect("open store"));
        let cancel = Arc::new(AtomicBool::new(false));
        let parent = PhaseContext::new("/repo", store, cancel, false);
        let (forked_a, deadline_a) = parent.fork_for_phase();
        let (forked_b, _deadline_b) = parent.fork_for_phase();

        deadline_a.store(true, Ordering::SeqCst);
        assert!(forked_a.cancelled());
        assert!(!forked_b.cancelled());
        assert!(!parent.cancelled());
    }
}
