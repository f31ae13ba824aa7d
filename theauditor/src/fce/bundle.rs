//! On-demand AI context bundle assembly: joins one convergence point with
//! every context-table row relevant to its file's extension.

use super::convergence::ConvergencePoint;
use crate::store::{registry, Store, StoreError};
use serde_json::Value;
use std::collections::BTreeMap;

/// A convergence point plus the context rows selected for its file's
/// extension, grouped by table name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AIContextBundle {
    pub point: ConvergencePoint,
    pub context_layers: BTreeMap<&'static str, Vec<Value>>,
}

/// Assembles a bundle for `point` by reading every context table selected
/// for `point.file`'s extension (per [`registry::tables_for_extension`])
/// and collecting whatever rows exist for that exact file.
pub fn assemble(store: &Store, point: ConvergencePoint) -> Result<AIContextBundle, StoreError> {
    let ext = std::path::Path::new(&point.file)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    let mut context_layers = BTreeMap::new();
    for table in registry::tables_for_extension(ext) {
        let rows = store.context_rows_for_file(table, &point.file)?;
        if rows.is_empty() {
            continue;
        }
        let parsed: Vec<Value> = rows
            .into_iter()
            .map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
            .collect();
        context_layers.insert(table, parsed);
    }

    Ok(AIContextBundle { point, context_layers })
}
