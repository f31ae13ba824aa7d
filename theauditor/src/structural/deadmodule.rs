//! Dead-module detection: files with symbols that are never referenced
//! anywhere — not imported, not mentioned in an assignment, not passed as
//! a call argument, and no symbol of theirs used as a bare identifier
//! (the JSX-component case from the original implementation).

use super::{is_excluded, Confidence, DeadCodeFinding, DeadKind, StructuralError};
use crate::graph::symbols::SymbolTable;
use crate::store::Store;
use std::collections::{HashMap, HashSet};

pub fn detect(
    store: &Store,
    symbols: &SymbolTable,
    include_tests: bool,
    exclude_patterns: &[String],
) -> Result<Vec<DeadCodeFinding>, StructuralError> {
    let mut symbol_count: HashMap<String, usize> = HashMap::new();
    let mut short_names_by_file: HashMap<String, Vec<String>> = HashMap::new();
    for entry in symbols.iter() {
        let info = entry.value();
        let file = info.file_path.to_string_lossy().into_owned();
        *symbol_count.entry(file.clone()).or_insert(0) += 1;
        let short_name = info.fqn.rsplit('.').next().unwrap_or(&info.fqn).to_owned();
        short_names_by_file.entry(file).or_default().push(short_name);
    }

    let referenced_values = store.all_ref_values()?;
    let referenced_exprs = store.all_referenced_expressions()?;

    let mut referenced_files: HashSet<String> = HashSet::new();
    for file in symbol_count.keys() {
        let basename = file.rsplit('/').next().unwrap_or(file);
        let hit_by_path = referenced_values
            .iter()
            .chain(referenced_exprs.iter())
            .any(|value| value.contains(file.as_str()) || value.contains(basename));
        let hit_by_symbol = short_names_by_file
            .get(file)
            .is_some_and(|names| names.iter().any(|n| referenced_exprs.contains(n)));
        if hit_by_path || hit_by_symbol {
            referenced_files.insert(file.clone());
        }
    }

    let mut isolated: Vec<&String> = symbol_count.keys().filter(|f| !referenced_files.contains(*f)).collect();
    isolated.sort();

    let mut findings = Vec::new();
    for file in isolated {
        if !include_tests && file.to_lowercase().contains("test") {
            continue;
        }
        if is_excluded(file, exclude_patterns) {
            continue;
        }
        let count = symbol_count.get(file).copied().unwrap_or(0);
        let (confidence, reason) = classify_module(file, count);
        findings.push(DeadCodeFinding {
            kind: DeadKind::Module,
            path: file.clone(),
            name: String::new(),
            line: 0,
            symbol_count: count,
            reason: reason.to_owned(),
            confidence,
        });
    }
    Ok(findings)
}

fn classify_module(path: &str, symbol_count: usize) -> (Confidence, &'static str) {
    if path.ends_with("__init__.py") && symbol_count == 0 {
        return (Confidence::Low, "Empty package marker (likely false positive)");
    }
    if path.to_lowercase().contains("migration") {
        return (Confidence::Medium, "Migration script (may be external entry)");
    }
    if path.ends_with("cli.py") || path.ends_with("__main__.py") || path.ends_with("main.py") {
        return (Confidence::Medium, "CLI/main entry point (may be invoked externally)");
    }
    (Confidence::High, "No references found anywhere")
}
