//! Findings & Context Engine: cross-vector correlation over the indexed
//! store. Aggregates every finding table plus taint flows into one ordered
//! list, detects multi-tool hotspots, computes per-file vector density,
//! clusters convergence points, evaluates correlation rules, and assembles
//! on-demand context bundles for a given file.

pub mod bundle;
pub mod convergence;
pub mod hotspot;
pub mod rules;
pub mod vector;

pub use bundle::AIContextBundle;
pub use convergence::ConvergencePoint;
pub use hotspot::Hotspot;
pub use rules::{CorrelationMatch, CorrelationRule};
pub use vector::{Vector, VectorSignal};

use crate::graph::symbols::SymbolTable;
use crate::severity::{self, RawSeverity};
use crate::store::{Store, StoreError, StoredFinding, StoredTaintFlow};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// The aggregated, normalized, ordered output of a full FCE run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FceReport {
    pub findings: Vec<StoredFinding>,
    pub hotspots: Vec<Hotspot>,
    pub convergence_points: Vec<ConvergencePoint>,
    pub correlation_matches: Vec<CorrelationMatch>,
    pub summary: Summary,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Summary {
    pub total_findings: usize,
    pub total_hotspots: usize,
    pub total_convergence_points: usize,
    pub total_correlation_matches: usize,
}

/// Runs the full seven-step correlation algorithm:
/// aggregate -> hotspot detection -> vector density -> convergence points ->
/// correlation rules -> normalize+sort -> (context bundles assembled
/// separately, on demand, via [`bundle::assemble`]).
pub fn correlate(
    store: &Store,
    symbols: &SymbolTable,
    taint_flows: &[StoredTaintFlow],
    loaded_rules: &[CorrelationRule],
    min_vectors: usize,
) -> Result<FceReport, FceError> {
    if min_vectors == 0 || min_vectors > 4 {
        return Err(FceError::InvalidArgument(format!(
            "min_vectors must be in 1..=4, got {min_vectors}"
        )));
    }

    // Step 1: aggregate. Findings are already consolidated into the store
    // by each analyzer phase; this reads them back as the single list the
    // rest of the algorithm operates over.
    let mut findings = store.read_findings()?;

    let hotspots = hotspot::detect(&findings, symbols);
    let signals = vector::compute_signals(&findings, taint_flows);
    let convergence_points = convergence::cluster(&findings, &signals, min_vectors);
    let correlation_matches = rules::evaluate_all(&findings, loaded_rules);

    normalize_and_sort(&mut findings);

    let summary = Summary {
        total_findings: findings.len(),
        total_hotspots: hotspots.len(),
        total_convergence_points: convergence_points.len(),
        total_correlation_matches: correlation_matches.len(),
    };

    Ok(FceReport { findings, hotspots, convergence_points, correlation_matches, summary })
}

/// Step 6: applies severity normalization to every finding, then sorts by
/// the `(severity rank, tool-importance rank, file, line)` comparator.
fn normalize_and_sort(findings: &mut [StoredFinding]) {
    for finding in findings.iter_mut() {
        let raw = parse_raw_severity(&finding.severity);
        finding.severity = severity::normalize(&raw).as_str().to_owned();
    }
    findings.sort_by(|a, b| {
        let key_a = severity::ordering_key(
            severity::Severity::from_str_lossy(&a.severity),
            &a.tool,
            &a.file,
            a.line,
        );
        let key_b = severity::ordering_key(
            severity::Severity::from_str_lossy(&b.severity),
            &b.tool,
            &b.file,
            b.line,
        );
        key_a.cmp(&key_b)
    });
}

fn parse_raw_severity(raw: &str) -> RawSeverity<'_> {
    if let Ok(f) = raw.parse::<f64>() {
        return RawSeverity::Float(f);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return RawSeverity::Int(i);
    }
    RawSeverity::Text(raw)
}

/// Returns every convergence point with at least `min_vectors` distinct
/// vectors, already clustered and sorted by the same density-then-path
/// order as the full report. Exposed separately for `theauditor fce
/// --min-vectors N` without re-running the whole correlation pass.
pub fn get_convergence_points(
    store: &Store,
    taint_flows: &[StoredTaintFlow],
    min_vectors: usize,
) -> Result<Vec<ConvergencePoint>, FceError> {
    if min_vectors == 0 || min_vectors > 4 {
        return Err(FceError::InvalidArgument(format!(
            "min_vectors must be in 1..=4, got {min_vectors}"
        )));
    }
    let findings = store.read_findings()?;
    let signals = vector::compute_signals(&findings, taint_flows);
    Ok(convergence::cluster(&findings, &signals, min_vectors))
}

/// Groups findings by file, used by several of the steps above.
pub(crate) fn group_by_file(findings: &[StoredFinding]) -> HashMap<&str, Vec<&StoredFinding>> {
    let mut groups: HashMap<&str, Vec<&StoredFinding>> = HashMap::new();
    for finding in findings {
        groups.entry(finding.file.as_str()).or_default().push(finding);
    }
    groups
}
