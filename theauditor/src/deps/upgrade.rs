//! Drives the destructive half of dependency analysis: rewriting a
//! manifest's version pins to the latest resolved versions. `upgrade_file`
//! itself only rewrites; this module is responsible for validating the
//! target path and creating a timestamped backup before it does.

use super::{DepsError, Dependency, PackageManager};
use crate::security::{self, SecurityError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error(transparent)]
    Security(#[from] SecurityError),
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup { path: PathBuf, backup: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Deps(#[from] DepsError),
}

/// One manifest's upgrade outcome: how many pins were rewritten and where
/// the pre-rewrite backup was saved.
#[derive(Debug, Clone)]
pub struct UpgradeResult {
    pub manifest: PathBuf,
    pub backup: PathBuf,
    pub pins_changed: usize,
}

/// Validates `manifest` resolves inside `root`, copies it to
/// `<manifest>.bak.<unix_seconds>`, then delegates to `manager.upgrade_file`.
/// The backup is created even if zero pins end up changing, since the
/// rewrite is attempted regardless and a failed partial rewrite should
/// still be recoverable from the backup.
pub fn upgrade_manifest(
    manager: &dyn PackageManager,
    root: &Path,
    manifest: &Path,
    latest: &HashMap<String, String>,
    deps: &[Dependency],
    unix_seconds: u64,
) -> Result<UpgradeResult, UpgradeError> {
    let validated = security::sanitize_path(&manifest.to_string_lossy(), Some(root))?;

    let backup = validated.with_extension(format!(
        "{}.bak.{unix_seconds}",
        validated.extension().map_or_else(|| "bak".to_owned(), |e| e.to_string_lossy().into_owned())
    ));
    std::fs::copy(&validated, &backup)
        .map_err(|source| UpgradeError::Backup { path: validated.clone(), backup: backup.clone(), source })?;

    let pins_changed = manager.upgrade_file(&validated, latest, deps)?;

    Ok(UpgradeResult { manifest: validated, backup, pins_changed })
}
