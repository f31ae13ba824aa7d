//! Workset Resolver: computes the subset of files an analysis run should
//! operate on — all files, files changed against a git ref, or an explicit
//! list — then expands through the ref graph and filters by glob.

pub mod expand;

use chrono::Utc;
use ignore::overrides::OverrideBuilder;
use rustc_hash::FxHashSet;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

pub use expand::{expand, resolve_specifier, RefGraph};

/// How the workset's seed set was chosen. The three modes are mutually
/// exclusive at the call site (see `crate::cli`).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum Seed {
    All,
    Diff(String),
    Files(Vec<PathBuf>),
}

/// One resolved workset entry: a repo-relative path and its content hash,
/// used by downstream consumers to detect staleness against a cached run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WorksetPath {
    pub path: PathBuf,
    pub sha256: String,
}

/// An immutable, ordered, deterministic file selection for one run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Workset {
    pub generated_at: String,
    pub root: PathBuf,
    pub seed: Seed,
    pub max_depth: usize,
    pub seed_file_count: usize,
    pub expanded_file_count: usize,
    pub paths: Vec<WorksetPath>,
}

/// Errors raised while resolving a workset.
#[derive(Debug, Error)]
pub enum WorksetError {
    #[error("failed to invoke git: {0}")]
    GitInvocation(std::io::Error),
    #[error("git diff exited with status {0}")]
    GitDiffFailed(i32),
    #[error("invalid include/exclude glob: {0}")]
    InvalidGlob(#[from] ignore::Error),
}

/// Options controlling workset expansion and filtering.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub max_depth: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Resolves a workset for `root` given a seed and the full repository
/// manifest (every known repo-relative file path). Git-diff seeds are
/// filtered against the manifest to drop deleted/renamed files that no
/// longer exist on disk.
pub fn resolve(
    root: &Path,
    seed: Seed,
    manifest: &[PathBuf],
    graph: &RefGraph,
    options: &ResolveOptions,
) -> Result<Workset, WorksetError> {
    let manifest_set: FxHashSet<PathBuf> = manifest.iter().cloned().collect();

    let seed_files: FxHashSet<PathBuf> = match &seed {
        Seed::All => manifest_set.clone(),
        Seed::Files(files) => files.iter().cloned().filter(|f| manifest_set.contains(f)).collect(),
        Seed::Diff(spec) => {
            let changed = git_diff_names(root, spec)?;
            changed.into_iter().filter(|f| manifest_set.contains(f)).collect()
        }
    };
    let seed_file_count = seed_files.len();

    let expanded = expand(&seed_files, graph, options.max_depth);

    let filtered = apply_globs(root, expanded, &options.include, &options.exclude)?;
    let expanded_file_count = filtered.len();

    let mut sorted: Vec<PathBuf> = filtered.into_iter().collect();
    sorted.sort();

    let paths = sorted
        .into_iter()
        .map(|path| {
            let sha256 = hash_file(&root.join(&path)).unwrap_or_default();
            WorksetPath { path, sha256 }
        })
        .collect();

    Ok(Workset {
        generated_at: Utc::now().to_rfc3339(),
        root: root.to_path_buf(),
        seed,
        max_depth: options.max_depth,
        seed_file_count,
        expanded_file_count,
        paths,
    })
}

/// Runs `git diff --name-only <spec>` in `root` and parses the output into
/// repo-relative paths.
fn git_diff_names(root: &Path, spec: &str) -> Result<Vec<PathBuf>, WorksetError> {
    let output = Command::new("git")
        .arg("diff")
        .arg("--name-only")
        .arg(spec)
        .current_dir(root)
        .output()
        .map_err(WorksetError::GitInvocation)?;

    if !output.status.success() {
        return Err(WorksetError::GitDiffFailed(output.status.code().unwrap_or(-1)));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().filter(|l| !l.is_empty()).map(PathBuf::from).collect())
}

/// Filters a file set by include/exclude glob lists. An empty include list
/// means "everything not excluded"; exclude always wins over include.
fn apply_globs(
    root: &Path,
    files: FxHashSet<PathBuf>,
    include: &[String],
    exclude: &[String],
) -> Result<FxHashSet<PathBuf>, WorksetError> {
    if include.is_empty() && exclude.is_empty() {
        return Ok(files);
    }

    let mut builder = OverrideBuilder::new(root);
    for pattern in exclude {
        builder.add(&format!("!{pattern}"))?;
    }
    for pattern in include {
        builder.add(pattern)?;
    }
    let overrides = builder.build()?;

    Ok(files
        .into_iter()
        .filter(|f| {
            matches!(
                overrides.matched(root.join(f), false),
                ignore::Match::Whitelist(_) | ignore::Match::None
            )
        })
        .collect())
}

/// Hex-encoded SHA-256 of a file's contents.
fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
