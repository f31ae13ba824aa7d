//! Dependency Analyzer: per-ecosystem manifest parsing behind a common
//! [`PackageManager`] abstraction, plus registry lookups and upgrade
//! rewriting.
//!
//! Manifest parsing (`parse_manifest`) is synchronous and never touches the
//! network. Version/doc lookups (`fetch_latest`, `fetch_docs`) are async and
//! go through [`rate_limit::HostRateLimiter`] and [`rate_limit::DepCache`] so
//! callers never hit a registry more than the documented rate.

pub mod cargo_ecosystem;
pub mod docker;
pub mod docker_tag;
pub mod go;
pub mod npm;
pub mod python;
pub mod rate_limit;
pub mod upgrade;

use async_trait::async_trait;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directories never descended into while discovering manifests.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".venv",
    "venv",
    "vendor",
    "build",
    "dist",
    "target",
    ".git",
    "__pycache__",
];

#[derive(Debug, Error)]
pub enum DepsError {
    #[error("failed to read manifest {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse manifest {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// A single extracted dependency record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub manager: &'static str,
    pub source_file: PathBuf,
    /// True for devDependencies / dev-only requirement groups.
    pub dev_only: bool,
}

/// Outcome of an async documentation fetch for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocFetchStatus {
    Saved(PathBuf),
    NotFound,
    NotAllowlisted,
    RateLimited,
}

/// Per-ecosystem behavior: manifest discovery, parsing, registry lookups,
/// and in-place upgrade rewriting. Implementations never invoke the actual
/// package manager binary (`npm`, `pip`, ...) — every operation is either a
/// pure parse or a direct HTTP call to the ecosystem's registry API.
#[async_trait]
pub trait PackageManager: Send + Sync {
    fn manager_name(&self) -> &'static str;

    /// Glob-style file name patterns this manager's manifests match, e.g.
    /// `["requirements*.txt"]`. A single `*` wildcard is supported.
    fn file_patterns(&self) -> &'static [&'static str];

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError>;

    /// Resolves the latest published version for `dep`, or `None` if the
    /// registry has no record (vs. `Err` for a transport/rate-limit error,
    /// which callers translate into the prerequisite's `error` field).
    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String>;

    async fn fetch_docs(
        &self,
        client: &reqwest::Client,
        dep: &Dependency,
        out_dir: &Path,
        allowlist: &[String],
    ) -> DocFetchStatus;

    /// Rewrites `path` in place, replacing each dependency's version pin
    /// with the resolved latest version. Returns the number of pins
    /// changed. Callers are responsible for creating the backup first.
    fn upgrade_file(
        &self,
        path: &Path,
        latest: &std::collections::HashMap<String, String>,
        deps: &[Dependency],
    ) -> Result<usize, DepsError>;
}

/// Returns one boxed instance of every known package manager, in a fixed
/// order (npm, Python, Docker, Cargo, Go) matching the spec's enumeration.
#[must_use]
pub fn managers() -> Vec<Box<dyn PackageManager>> {
    vec![
        Box::new(npm::NpmManager),
        Box::new(python::PythonManager),
        Box::new(docker::DockerManager),
        Box::new(cargo_ecosystem::CargoManager),
        Box::new(go::GoManager),
    ]
}

/// Matches a file name against a manager's glob patterns. Supports at most
/// one `*` per pattern, sufficient for the fixed pattern set in use here.
#[must_use]
pub fn matches_pattern(file_name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        None => file_name == pattern,
        Some((prefix, suffix)) => {
            file_name.len() >= prefix.len() + suffix.len()
                && file_name.starts_with(prefix)
                && file_name.ends_with(suffix)
        }
    }
}

/// Walks `root` (respecting the standard exclusion list) collecting every
/// file matching any of `patterns`.
fn discover_manifests(root: &Path, patterns: &'static [&'static str]) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !EXCLUDED_DIRS.contains(&name))
        })
        .build();

    let mut found = Vec::new();
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else { continue };
        if patterns.iter().any(|p| matches_pattern(file_name, p)) {
            found.push(entry.into_path());
        }
    }
    found
}

/// Runs every manager's discovery + parse over `root`, returning the full
/// set of dependency records across every ecosystem found.
#[must_use]
pub fn collect_dependencies(root: &Path) -> Vec<Dependency> {
    let mut out = Vec::new();
    for manager in managers() {
        for manifest in discover_manifests(root, manager.file_patterns()) {
            match manager.parse_manifest(&manifest) {
                Ok(deps) => out.extend(deps),
                Err(_) => continue,
            }
        }
    }
    out.sort_by(|a, b| a.manager.cmp(b.manager).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Removes semver range operators (`^`, `~`, `>=`, ...) and surrounding
/// whitespace from the front of a version string.
#[must_use]
pub fn strip_semver_operators(raw: &str) -> String {
    raw.trim_start_matches(['^', '~', '=', '>', '<', ' ']).trim().to_owned()
}
