//! Dead-class detection: `Class` symbols whose short name never appears as
//! a call (instantiation), a bare variable usage, a non-dotted `refs`
//! value, or inside any assignment's source expression. Abstract/base/
//! mixin/exception name-suffix heuristics reduce confidence rather than
//! suppressing the finding outright, since those names are still
//! legitimately unused more often than not.

use super::{is_excluded, Confidence, DeadCodeFinding, DeadKind, StructuralError};
use crate::graph::symbols::{SymbolTable, SymbolType};
use crate::store::Store;
use std::collections::HashSet;

pub fn detect(
    store: &Store,
    symbols: &SymbolTable,
    include_tests: bool,
    exclude_patterns: &[String],
) -> Result<Vec<DeadCodeFinding>, StructuralError> {
    let called = store.all_called_function_names()?;
    let used: HashSet<String> = store.all_referenced_expressions()?.into_iter().collect();
    let bare_refs: HashSet<String> =
        store.all_ref_values()?.into_iter().filter(|v| !v.contains('.')).collect();

    let mut findings = Vec::new();
    for entry in symbols.iter() {
        let info = entry.value();
        if !matches!(info.def_type, SymbolType::Class) {
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

        if called.contains(&name) || used.contains(&name) || bare_refs.contains(&name) {
            continue;
        }
        if used.iter().any(|expr| expr.contains(&name)) {
            continue;
        }

        let confidence = if name.starts_with("Base")
            || name.starts_with("Abstract")
            || name.ends_with("Mixin")
            || name.ends_with("Exception")
            || name.ends_with("Error")
        {
            Confidence::Medium
        } else {
            Confidence::High
        };

        findings.push(DeadCodeFinding {
            kind: DeadKind::Class,
            path,
            name,
            line: info.line,
            symbol_count: 1,
            reason: "Class defined but never instantiated".to_owned(),
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
    use std::path::{Path, PathBuf};

    fn class_sym(fqn: &str, file: &str) -> SymbolInfo {
        SymbolInfo {
            fqn: fqn.to_owned(),
            file_path: PathBuf::from(file),
            line: 10,
            def_type: SymbolType::Class,
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
    fn uninstantiated_class_is_flagged_high_confidence() {
        let store = Store::open_in_memory().expect("open");
        store.write_symbols(Path::new("pkg/a.py"), &[class_sym("pkg.a.Widget", "pkg/a.py")]).expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0].confidence, Confidence::High));
    }

    #[test]
    fn base_class_name_gets_reduced_confidence() {
        let store = Store::open_in_memory().expect("open");
        store.write_symbols(Path::new("pkg/a.py"), &[class_sym("pkg.a.BaseWidget", "pkg/a.py")]).expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert_eq!(found.len(), 1);
        matches!(found[0].confidence, Confidence::Medium);
    }

    #[test]
    fn instantiated_class_is_not_flagged() {
        let store = Store::open_in_memory().expect("open");
        store.write_symbols(Path::new("pkg/a.py"), &[class_sym("pkg.a.Widget", "pkg/a.py")]).expect("write");
        store
            .write_function_call_args(&[FunctionCallArgRow {
                file: "pkg/b.py".to_owned(),
                line: 1,
                callee_function: "Widget".to_owned(),
                argument_index: 0,
                argument_expr: None,
            }])
            .expect("write");
        let symbols = store.load_symbol_table().expect("load");

        let found = detect(&store, &symbols, false, &[]).expect("detect");
        assert!(found.is_empty());
    }
}
