//! Structural analysis: dead-module/function/class detection via set
//! differences over the indexed store's extraction tables, reusing
//! `graph::symbols::SymbolType` for dunder/test exclusion. Generalizes the
//! teacher's existing `cfg::`/`graph::` modules (control-flow graph and
//! symbol table) to the cross-file reachability questions those modules
//! don't themselves answer.
//!
//! Grounded on `original_source/theauditor/context/deadcode.py`'s
//! multi-table-JOIN algorithm: isolated modules (no reference anywhere),
//! dead functions (never called), dead classes (never instantiated).

pub mod deadclass;
pub mod deadfunction;
pub mod deadmodule;
pub mod explain;

use crate::store::{Store, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructuralError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Confidence that a dead-code finding is a true positive rather than an
/// entry point, test fixture, or package marker invoked from outside the
/// indexed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadKind {
    Module,
    Function,
    Class,
}

/// One dead-code finding, independent of which of the three detectors
/// produced it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeadCodeFinding {
    pub kind: DeadKind,
    pub path: String,
    /// Empty for module findings.
    pub name: String,
    /// 0 for module findings (a whole-file finding has no single line).
    pub line: usize,
    pub symbol_count: usize,
    pub reason: String,
    pub confidence: Confidence,
}

/// Path fragments that exclude a file from dead-module/function/class
/// consideration regardless of reachability, mirroring the Python
/// implementation's `DEFAULT_EXCLUSIONS`.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "__init__.py",
    "test",
    "__tests__",
    ".test.",
    ".spec.",
    "migration",
    "migrations",
    "__pycache__",
    "node_modules",
    ".venv",
    "dist",
    "build",
    ".next",
    ".nuxt",
];

fn is_excluded(path: &str, extra: &[String]) -> bool {
    DEFAULT_EXCLUSIONS.iter().any(|p| path.contains(p)) || extra.iter().any(|p| path.contains(p.as_str()))
}

/// Runs all three detectors against the store, pooling the results in
/// detection order (modules, then functions, then classes).
pub fn detect_all(
    store: &Store,
    include_tests: bool,
    exclude_patterns: &[String],
) -> Result<Vec<DeadCodeFinding>, StructuralError> {
    let symbols = store.load_symbol_table()?;
    let mut findings = Vec::new();
    findings.extend(deadmodule::detect(store, &symbols, include_tests, exclude_patterns)?);
    findings.extend(deadfunction::detect(store, &symbols, include_tests, exclude_patterns)?);
    findings.extend(deadclass::detect(store, &symbols, include_tests, exclude_patterns)?);
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_excluded_matches_default_patterns() {
        assert!(is_excluded("pkg/__init__.py", &[]));
        assert!(is_excluded("db/migrations/0001.py", &[]));
        assert!(!is_excluded("pkg/service.py", &[]));
    }

    #[test]
    fn is_excluded_matches_caller_supplied_patterns() {
        assert!(is_excluded("vendor/lib.py", &["vendor".to_owned()]));
    }
}
