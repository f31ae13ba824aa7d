//! The runner's own error taxonomy (spec §7): which kinds a phase absorbs
//! into its own `PhaseResult` versus which bubble up and abort the whole
//! pipeline.

use crate::store::StoreError;
use thiserror::Error;

/// Non-recoverable failures. Everything else (`tool_unavailable`,
/// `parse_error`, `rate_limited`) is absorbed inside a phase and surfaces
/// only as that phase's `PhaseResult`; these two terminate the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input (store, manifest) was not present before the run
    /// even started.
    #[error("prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    /// The store's schema version doesn't match this build's.
    #[error(transparent)]
    SchemaStale(#[from] StoreError),

    /// A path supplied to the pipeline escaped the project root.
    #[error("security error: {0}")]
    SecurityError(String),
}

impl PipelineError {
    /// Maps to the exit codes in spec §6.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PrerequisiteMissing(_) => 3,
            Self::SchemaStale(_) => 10,
            Self::SecurityError(_) => 1,
        }
    }
}
