//! Error taxonomy for the indexed store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors the store can raise. `SchemaStale` and `Open` are the only two the
/// pipeline runner treats as non-recoverable (see `crate::pipeline::error`).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file exists but was built by a different schema version.
    #[error("store schema is stale: found version {found}, expected {expected}; rebuild the store")]
    SchemaStale { found: i64, expected: i64 },

    /// The store could not be opened at all (missing parent dir, permissions, ...).
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A parameterized query or write failed.
    #[error(transparent)]
    Query(#[from] rusqlite::Error),

    /// A path supplied to a read/write API escaped the project root or
    /// otherwise failed validation before reaching SQL.
    #[error("rejected unsafe path: {0}")]
    UnsafePath(String),
}
