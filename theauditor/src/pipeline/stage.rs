//! The four fixed stages (spec §4.9). Stages are sequential; the phases
//! inside one are scheduled onto parallel tracks by `super::scheduler`.

use super::phase::PhaseOperation;

/// One of the pipeline's four fixed stages, carrying its own phase list.
pub struct Stage {
    pub name: &'static str,
    pub number: usize,
    pub phases: Vec<Box<dyn PhaseOperation>>,
}

impl Stage {
    #[must_use]
    pub fn new(name: &'static str, number: usize, phases: Vec<Box<dyn PhaseOperation>>) -> Self {
        Self { name, number, phases }
    }
}

/// Stage names and numbers in pipeline order, independent of which phases
/// a caller populates each one with.
pub const STAGE_NAMES: [(&str, usize); 4] = [
    ("Index & detect", 1),
    ("Resolve & prepare", 2),
    ("Analyze", 3),
    ("Correlate & report", 4),
];
