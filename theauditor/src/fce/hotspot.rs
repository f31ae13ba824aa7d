//! Hotspot detection: locations where findings from two or more distinct
//! tools land on the same `(file, line)`.

use crate::graph::symbols::{SymbolTable, SymbolType};
use crate::store::StoredFinding;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// A `(file, line)` key touched by findings from at least two distinct
/// tools, enriched with the nearest enclosing function or class.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Hotspot {
    pub file: String,
    pub line: usize,
    pub tools: Vec<String>,
    pub findings: Vec<StoredFinding>,
    pub in_symbol: Option<String>,
}

/// Groups findings by `(file, line)` (skipping file-level findings where
/// `line == 0`) and keeps groups touched by `>= 2` distinct tools.
#[must_use]
pub fn detect(findings: &[StoredFinding], symbols: &SymbolTable) -> Vec<Hotspot> {
    let mut groups: BTreeMap<(String, usize), Vec<StoredFinding>> = BTreeMap::new();

    for finding in findings {
        if finding.line == 0 {
            continue;
        }
        groups.entry((finding.file.clone(), finding.line)).or_default().push(finding.clone());
    }

    groups
        .into_iter()
        .filter_map(|((file, line), group)| {
            let distinct_tools: FxHashSet<&str> = group.iter().map(|f| f.tool.as_str()).collect();
            if distinct_tools.len() < 2 {
                return None;
            }
            let mut tools: Vec<String> = distinct_tools.into_iter().map(str::to_owned).collect();
            tools.sort();
            let in_symbol = nearest_enclosing_symbol(symbols, &file, line);
            Some(Hotspot { file, line, tools, findings: group, in_symbol })
        })
        .collect()
}

/// The nearest enclosing function or class: the symbol in `file` with the
/// greatest `line <= hotspot_line` among function/method/class definitions.
fn nearest_enclosing_symbol(symbols: &SymbolTable, file: &str, hotspot_line: usize) -> Option<String> {
    let mut best: Option<(usize, String)> = None;
    for entry in symbols.iter() {
        let info = entry.value();
        if info.file_path.to_string_lossy() != file {
            continue;
        }
        if !matches!(info.def_type, SymbolType::Function | SymbolType::Method | SymbolType::Class) {
            continue;
        }
        if info.line > hotspot_line {
            continue;
        }
        let is_better = match &best {
            None => true,
            Some((best_line, _)) => info.line > *best_line,
        };
        if is_better {
            best = Some((info.line, info.fqn.clone()));
        }
    }
    best.map(|(_, fqn)| fqn)
}
