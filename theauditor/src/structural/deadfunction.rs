//! Dead-function detection: `Function`/`Method` symbols whose short name
//! never appears as a `function_call_args.callee_function` or a bare
//! `variable_usage.name`, excluding dunder methods, `test_*` names, and
//! well-known entry-point names.

use super::{is_excluded, Confidence, DeadCodeFinding, DeadKind, StructuralError};
use crate::graph::symbols::{SymbolTable, SymbolType};
use crate::store::Store;
use std::collections::HashSet;

const ENTRY_POINT_NAMES: &[&str] = &["main", "__init__", "__main__", "cli", "__repr__", "__str__"];

pub fn detect(
    store: &Store,
    symbols: &SymbolTable,
    include_tests: bool,
    exclude_patterns: &[String],
) -> Result<Vec<DeadCodeFinding>, StructuralError> {
    let called = store.all_called_function_names()?;
    let used: HashSet<String> = store
        .all_referenced_expressions()?
        .into_iter()
        .filter(|e| !e.contains('.') && !e.contains('('))
        .collect();

    let mut findings = Vec::new();
    for entry in symbols.iter() {
        let info = entry.value();
        if !matches!(info.def_type, SymbolType::Function | SymbolType::Method) {
            continue;
        }
        let path = info.file_path.to_string_lossy().into_owned();
        if !include_tests && path.to_lowercase().contains("test") {
            continue;
        }
        if is_excluded(&path, exclude_patterns) {
            continue;
        }
        let name = info.fqn.rsplit('.').next().unwrap_or(&info.fqn).to_owned();
        if name.starts_with("test_") || ENTRY_POINT_NAMES.contains(&name.as_str()) {
            continue;
        }
        if called.contains(&name) || used.contains(&name) {
            continue;
        }

        let (confidence, reason) = if name.starts_with('_') && !name.starts_with("__") {
            (Confidence::Medium, "Private function (may be internal API)")
        } else if path.ends_with("cli.py") || path.ends_with("main.py") || path.ends_with("__main__.py") {
            (Confidence::Medium, "Entry point file (may be invoked externally)")
        } else {
            (Confidence::High, "Function defined but never called")
        };

        findings.push(DeadCodeFinding {
            kind: DeadKind::Function,
            path,
            name,
            line: info.line,
            symbol_count: 1,
            reason: reason.to_owned(),
            confidence,
        });
    }
    findings.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.line.cmp(&b.line)));
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::symbols::SymbolInfo;
    use crate::store::{FunctionCallArgRow, Store};
    use std::path::PathBuf;

    fn sym(fqn: &str, file: &str, line: usize) -> SymbolInfo {
        SymbolInfo {
            fqn: fqn.to_owned(),
            file_path: PathBuf::from(file),
            line,
            def_type: SymbolType::Function,
            params: Vec::new(),
            module_path: String::new(),
            is_exported: true,
            is_entry_point: false,
            start_byte: 0,
            end_byte: 0,
            decorators: Vec::new(),
            base_classes: Vec::new(),
        }
    }

    #[test]
    fn uncalled_function_is_flagged() {
        let store = Store::open_in_memory().expect("open");
        store.write_symbols(std::path::Path::new("pkg/a.py"), &[sym("pkg.a.helper", "pkg/a.py", 3)]).expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "helper");
    }

    #[test]
    fn called_function_is_not_flagged() {
        let store = Store::open_in_memory().expect("open");
        store.write_symbols(std::path::Path::new("pkg/a.py"), &[sym("pkg.a.helper", "pkg/a.py", 3)]).expect("write");
        store
            .write_function_call_args(&[FunctionCallArgRow {
                file: "pkg/b.py".to_owned(),
                line: 1,
                callee_function: "helper".to_owned(),
                argument_index: 0,
                argument_expr: None,
            }])
            .expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert!(found.is_empty());
    }

    #[test]
    fn dunder_and_entry_point_names_are_never_flagged() {
        let store = Store::open_in_memory().expect("open");
        store
            .write_symbols(
                std::path::Path::new("pkg/a.py"),
                &[sym("pkg.a.__init__", "pkg/a.py", 1), sym("pkg.a.main", "pkg/a.py", 5)],
            )
            .expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert!(found.is_empty());
    }
}
