//! Vector-signal density: which of the four independent analysis axes
//! produced at least one fact about a given file.

use crate::store::{StoredFinding, StoredTaintFlow};
use std::collections::{BTreeSet, HashMap};

/// Tool name the structural analyzer writes its findings under. Anything
/// else that isn't `PROCESS_TOOL` counts toward `STATIC`.
const STRUCTURAL_TOOL: &str = "theauditor-structural";
/// Tool name churn/history-derived facts are written under.
const PROCESS_TOOL: &str = "theauditor-process";

/// One of the four independent analysis axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vector {
    Static,
    Flow,
    Process,
    Structural,
}

impl Vector {
    /// The single-character code used by [`VectorSignal::code`], in fixed
    /// `S F P T` order (the fourth letter stands for the structural axis).
    #[must_use]
    fn letter(self) -> char {
        match self {
            Self::Static => 'S',
            Self::Flow => 'F',
            Self::Process => 'P',
            Self::Structural => 'T',
        }
    }
}

/// The set of vectors that produced at least one fact about a file, plus
/// the derived count/density.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VectorSignal {
    pub vectors_present: BTreeSet<Vector>,
    pub vector_count: usize,
    pub density: f64,
}

impl VectorSignal {
    #[must_use]
    pub fn from_vectors(vectors_present: BTreeSet<Vector>) -> Self {
        let vector_count = vectors_present.len();
        #[allow(clippy::cast_precision_loss)]
        let density = vector_count as f64 / 4.0;
        Self { vectors_present, vector_count, density }
    }

    /// Renders the fixed four-character `S F P T` code, e.g. `"SFPT"`,
    /// `"S--T"`, `"----"`.
    #[must_use]
    pub fn code(&self) -> String {
        [Vector::Static, Vector::Flow, Vector::Process, Vector::Structural]
            .into_iter()
            .map(|v| if self.vectors_present.contains(&v) { v.letter() } else { '-' })
            .collect()
    }

    #[must_use]
    pub fn density_label(&self) -> String {
        format!("{}/4 vectors", self.vector_count)
    }
}

/// Classifies a finding's tool name into the vector it contributes to.
/// Per the spec: `STATIC` is every linter/pattern tool *other than* the
/// structural analyzer; process/structural facts are tagged distinctly.
fn vector_for_tool(tool: &str) -> Vector {
    if tool == STRUCTURAL_TOOL {
        Vector::Structural
    } else if tool == PROCESS_TOOL {
        Vector::Process
    } else {
        Vector::Static
    }
}

/// Computes the per-file vector signal for every file referenced by any
/// finding or taint flow.
#[must_use]
pub fn compute_signals(
    findings: &[StoredFinding],
    taint_flows: &[StoredTaintFlow],
) -> HashMap<String, VectorSignal> {
    let mut per_file: HashMap<String, BTreeSet<Vector>> = HashMap::new();

    for finding in findings {
        per_file.entry(finding.file.clone()).or_default().insert(vector_for_tool(&finding.tool));
    }

    for flow in taint_flows {
        per_file.entry(flow.source_file.clone()).or_default().insert(Vector::Flow);
        per_file.entry(flow.sink_file.clone()).or_default().insert(Vector::Flow);
    }

    per_file.into_iter().map(|(file, vectors)| (file, VectorSignal::from_vectors(vectors))).collect()
}
