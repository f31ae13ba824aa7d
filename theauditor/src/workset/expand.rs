//! Ref-graph expansion: given a seed set of files, walks forward and
//! reverse dependency edges up to a bounded depth, alternating direction at
//! each level.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when a relative specifier doesn't already
/// name a file directly — e.g. `./utils` first tries `./utils.ts`, then
/// `./utils/index.ts`, and so on through the list.
const EXTENSION_CANDIDATES: &[&str] = &["ts", "tsx", "js", "jsx", "py"];

/// A directed edge view over the `refs`/import graph: `forward` maps a file
/// to the files it imports; `reverse` maps a file to the files that import
/// it. Built once from the store's `refs` table per run.
#[derive(Debug, Default, Clone)]
pub struct RefGraph {
    forward: FxHashMap<PathBuf, Vec<PathBuf>>,
    reverse: FxHashMap<PathBuf, Vec<PathBuf>>,
}

impl RefGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directed edge `from -> to` (from imports to), updating
    /// both the forward and reverse adjacency maps.
    pub fn add_edge(&mut self, from: PathBuf, to: PathBuf) {
        self.forward.entry(from.clone()).or_default().push(to.clone());
        self.reverse.entry(to).or_default().push(from);
    }

    #[must_use]
    pub fn forward_deps(&self, file: &Path) -> &[PathBuf] {
        self.forward.get(file).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn reverse_deps(&self, file: &Path) -> &[PathBuf] {
        self.reverse.get(file).map_or(&[], Vec::as_slice)
    }
}

/// Resolves a relative import specifier (`./utils`, `../lib/parse`) against
/// the importing file's directory, trying language-appropriate extensions
/// and `/index` variants in turn. Returns the first candidate present in
/// `known_files`. Absolute/package specifiers (no leading `.`) are not
/// resolved here — they belong to the dependency graph, not the ref graph.
#[must_use]
pub fn resolve_specifier(
    importer: &Path,
    specifier: &str,
    known_files: &FxHashSet<PathBuf>,
) -> Option<PathBuf> {
    if !specifier.starts_with('.') {
        return None;
    }
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(specifier);

    if known_files.contains(&joined) {
        return Some(joined);
    }
    for ext in EXTENSION_CANDIDATES {
        let candidate = joined.with_extension(ext);
        if known_files.contains(&candidate) {
            return Some(candidate);
        }
    }
    for ext in EXTENSION_CANDIDATES {
        let candidate = joined.join(format!("index.{ext}"));
        if known_files.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Expands a seed set through `graph` to `max_depth`, alternating forward
/// and reverse edges at each level (level 0: forward from seeds; level 1:
/// reverse from the level-0 frontier; and so on). Monotonic: the result at
/// depth `k+1` is always a superset of the result at depth `k`, since each
/// level only adds to the accumulated set and never removes from it.
#[must_use]
pub fn expand(seeds: &FxHashSet<PathBuf>, graph: &RefGraph, max_depth: usize) -> FxHashSet<PathBuf> {
    let mut accumulated: FxHashSet<PathBuf> = seeds.clone();
    let mut frontier: FxHashSet<PathBuf> = seeds.clone();

    for depth in 0..max_depth {
        let mut next_frontier: FxHashSet<PathBuf> = FxHashSet::default();
        let forward_direction = depth % 2 == 0;

        for file in &frontier {
            let neighbors = if forward_direction {
                graph.forward_deps(file)
            } else {
                graph.reverse_deps(file)
            };
            for neighbor in neighbors {
                if accumulated.insert(neighbor.clone()) {
                    next_frontier.insert(neighbor.clone());
                }
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    accumulated
}
