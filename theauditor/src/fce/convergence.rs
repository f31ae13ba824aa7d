//! Convergence points: per-file locations where multiple analysis vectors
//! co-produce facts, filtered by a minimum vector count and sorted by
//! density.

use super::vector::{Vector, VectorSignal};
use crate::store::StoredFinding;
use std::collections::HashMap;

const STRUCTURAL_TOOL: &str = "theauditor-structural";
const PROCESS_TOOL: &str = "theauditor-process";

/// One fact contributing to a convergence point.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvergenceFact {
    pub file: String,
    pub line: usize,
    pub vector: Vector,
    pub rule: String,
    pub tool: String,
}

/// A location where `>= min_vectors` distinct analysis vectors intersect.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvergencePoint {
    pub file: String,
    pub line_start: usize,
    pub line_end: usize,
    pub signal: VectorSignal,
    pub facts: Vec<ConvergenceFact>,
}

fn vector_for_tool(tool: &str) -> Vector {
    if tool == STRUCTURAL_TOOL {
        Vector::Structural
    } else if tool == PROCESS_TOOL {
        Vector::Process
    } else {
        Vector::Static
    }
}

/// Clusters findings per file (one point per file, bracketing every finding
/// line for that file) and keeps only points whose vector count meets
/// `min_vectors`. Sorted by density descending, then by file path
/// ascending, matching the FCE's step-4 ordering.
#[must_use]
pub fn cluster(
    findings: &[StoredFinding],
    signals: &HashMap<String, VectorSignal>,
    min_vectors: usize,
) -> Vec<ConvergencePoint> {
    let mut facts_by_file: HashMap<&str, Vec<ConvergenceFact>> = HashMap::new();
    for finding in findings {
        facts_by_file.entry(finding.file.as_str()).or_default().push(ConvergenceFact {
            file: finding.file.clone(),
            line: finding.line,
            vector: vector_for_tool(&finding.tool),
            rule: finding.rule.clone(),
            tool: finding.tool.clone(),
        });
    }

    let mut points: Vec<ConvergencePoint> = facts_by_file
        .into_iter()
        .filter_map(|(file, facts)| {
            let signal = signals.get(file)?.clone();
            if signal.vector_count < min_vectors {
                return None;
            }
            let line_start = facts.iter().map(|f| f.line).min().unwrap_or(0);
            let line_end = facts.iter().map(|f| f.line).max().unwrap_or(0);
            Some(ConvergencePoint { file: file.to_owned(), line_start, line_end, signal, facts })
        })
        .collect();

    points.sort_by(|a, b| {
        b.signal
            .density
            .partial_cmp(&a.signal.density)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });
    points
}
