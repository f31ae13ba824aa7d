//! The indexed store: a single embedded SQLite database holding every
//! extracted and derived fact for one pipeline run.
//!
//! Readers and writers share one [`Store`] handle backed by a single
//! `rusqlite::Connection` behind a mutex — `rusqlite`'s own locking already
//! serializes writers at the file level, so this stands in for the
//! "process-wide connection pool" of the design without pulling in a
//! separate pooling crate. Writers to disjoint tables may still run
//! concurrently from the caller's point of view; only the SQLite write
//! lock itself serializes the actual I/O.

pub mod error;
pub mod registry;
pub mod schema;

pub use error::StoreError;

use crate::framework::detector::{DetectionOrigin, FrameworkRecord};
use crate::graph::symbols::{SymbolInfo, SymbolTable};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A single row in `findings_consolidated` — the universal finding shape
/// every analyzer normalizes into before persistence.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredFinding {
    pub file: String,
    pub line: usize,
    pub end_line: Option<usize>,
    pub rule: String,
    pub tool: String,
    pub message: String,
    pub severity: String,
    pub category: Option<String>,
    pub cwe: Option<String>,
    pub code_snippet: Option<String>,
    pub timestamp: String,
    pub details: String,
}

impl StoredFinding {
    /// Builds a finding with the current time as its provenance timestamp.
    /// Invariant: `file`, `tool`, and `rule` must be non-empty (enforced by
    /// the caller; the store does not validate business invariants).
    #[must_use]
    pub fn now(
        file: impl Into<String>,
        line: usize,
        rule: impl Into<String>,
        tool: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            end_line: None,
            rule: rule.into(),
            tool: tool.into(),
            message: message.into(),
            severity: severity.into(),
            category: None,
            cwe: None,
            code_snippet: None,
            timestamp: Utc::now().to_rfc3339(),
            details: "{}".to_owned(),
        }
    }
}

/// One row in `refs` — an import/include/require-style reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RefRow {
    pub src_file: String,
    pub kind: String,
    pub value: String,
    pub line: usize,
}

/// One row in `calls` — a call site resolved (or not) against the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRow {
    pub caller_file: String,
    pub caller_function: Option<String>,
    pub caller_line: usize,
    pub callee_function: String,
    pub argument_expression: Option<String>,
}

/// One row in `assignments`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRow {
    pub file: String,
    pub line: usize,
    pub target_var: String,
    pub source_expr: String,
    pub in_function: Option<String>,
    pub property_path: Option<String>,
}

/// One row in `function_call_args` — one positional argument of one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallArgRow {
    pub file: String,
    pub line: usize,
    pub callee_function: String,
    pub argument_index: usize,
    pub argument_expr: Option<String>,
}

/// One row in `variable_usage`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableUsageRow {
    pub file: String,
    pub line: usize,
    pub name: String,
    pub usage_kind: String,
}

/// One row in `dependencies` — an owned-string mirror of
/// [`crate::deps::Dependency`], whose `manager` field is `&'static str` and
/// so isn't itself round-trippable through a SQL text column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRow {
    pub name: String,
    pub version: String,
    pub manager: String,
    pub source_file: String,
    pub dev_only: bool,
}

/// One row in `taint_flows`.
#[derive(Debug, Clone)]
pub struct StoredTaintFlow {
    pub source_file: String,
    pub source_line: usize,
    pub source_pattern: String,
    pub sink_file: String,
    pub sink_line: usize,
    pub sink_pattern: String,
    pub vulnerability_type: String,
    pub confidence: f64,
    /// JSON-encoded ordered list of `(file, line, expression)` steps.
    pub intermediate_steps: String,
}

/// The store handle. Cheap to clone (wraps an `Arc`-free `Mutex`, so share
/// via `&Store` or wrap in `Arc<Store>` across threads).
pub struct Store {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Store {
    /// Opens (creating if missing) the store at `path`. On an existing
    /// store whose schema version doesn't match the code's, returns
    /// `StoreError::SchemaStale` without touching any table — the pipeline
    /// must surface this as `schema_stale` (exit code 10) rather than
    /// silently rebuilding.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        match schema::read_version(&conn)? {
            None => schema::create_all(&conn)?,
            Some(found) if found == schema::SCHEMA_VERSION => {}
            Some(found) => {
                return Err(StoreError::SchemaStale {
                    found,
                    expected: schema::SCHEMA_VERSION,
                })
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Opens an in-memory store (tests, or `--offline` dry runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::create_all(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every symbol from an extraction pass in a single transaction:
    /// either all of a phase's rows land, or (on error) none do.
    pub fn write_symbols(&self, file: &Path, symbols: &[SymbolInfo]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO symbols (fqn, file, line, end_line, def_type, signature, in_function)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for sym in symbols {
                stmt.execute(params![
                    sym.fqn,
                    file.to_string_lossy(),
                    sym.line,
                    Option::<i64>::None,
                    format!("{:?}", sym.def_type),
                    Option::<String>::None,
                    Option::<String>::None,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Bulk-loads an in-memory [`SymbolTable`] built during extraction,
    /// used by components (taint, FCE) that want the whole table resident
    /// rather than re-querying the store per lookup.
    pub fn load_symbol_table(&self) -> Result<SymbolTable, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let table = SymbolTable::new();
        let mut stmt = conn.prepare("SELECT fqn, file, line, def_type FROM symbols")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for row in rows {
            let (fqn, file, line, def_type) = row?;
            let def_type = match def_type.as_str() {
                "Function" => crate::graph::symbols::SymbolType::Function,
                "Method" => crate::graph::symbols::SymbolType::Method,
                "Class" => crate::graph::symbols::SymbolType::Class,
                "Variable" => crate::graph::symbols::SymbolType::Variable,
                "Import" => crate::graph::symbols::SymbolType::Import,
                "Module" => crate::graph::symbols::SymbolType::Module,
                _ => crate::graph::symbols::SymbolType::Unknown,
            };
            #[allow(clippy::cast_sign_loss)]
            table.insert(
                fqn.clone(),
                SymbolInfo {
                    fqn,
                    file_path: PathBuf::from(file),
                    line: line as usize,
                    def_type,
                    params: Vec::new(),
                    module_path: String::new(),
                    is_exported: false,
                    is_entry_point: false,
                    start_byte: 0,
                    end_byte: 0,
                    decorators: Vec::new(),
                    base_classes: Vec::new(),
                },
            );
        }
        Ok(table)
    }

    /// Writes every reference (import/include/require) found in `file`.
    pub fn write_refs(&self, refs: &[RefRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO refs (src_file, kind, value, line) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in refs {
                stmt.execute(params![r.src_file, r.kind, r.value, r.line])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every reference recorded for `file`, in insertion order.
    pub fn refs_for_file(&self, file: &str) -> Result<Vec<RefRow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn
            .prepare("SELECT src_file, kind, value, line FROM refs WHERE src_file = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![file], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(RefRow {
                src_file: row.get(0)?,
                kind: row.get(1)?,
                value: row.get(2)?,
                line: row.get::<_, i64>(3)? as usize,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Returns the distinct set of every `value` ever recorded in `refs`,
    /// used by dead-module/import-reachability analysis to test whether a
    /// module path is referenced anywhere in the project.
    pub fn all_ref_values(&self) -> Result<std::collections::HashSet<String>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare("SELECT DISTINCT value FROM refs")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }

    /// Writes every call site found in `file`.
    pub fn write_calls(&self, calls: &[CallRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calls (caller_file, caller_function, caller_line, callee_function, argument_expression)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for c in calls {
                stmt.execute(params![
                    c.caller_file,
                    c.caller_function,
                    c.caller_line,
                    c.callee_function,
                    c.argument_expression,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every call site made from `file`, in insertion order.
    pub fn calls_for_file(&self, file: &str) -> Result<Vec<CallRow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT caller_file, caller_function, caller_line, callee_function, argument_expression
             FROM calls WHERE caller_file = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(CallRow {
                caller_file: row.get(0)?,
                caller_function: row.get(1)?,
                caller_line: row.get::<_, i64>(2)? as usize,
                callee_function: row.get(3)?,
                argument_expression: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Returns the distinct set of every `callee_function` ever called,
    /// across both `calls` and `function_call_args`. Used by dead-function
    /// detection to test whether a defined symbol is ever invoked.
    pub fn all_called_function_names(&self) -> Result<std::collections::HashSet<String>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut names = std::collections::HashSet::new();
        let mut stmt = conn.prepare("SELECT DISTINCT callee_function FROM calls")?;
        for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
            names.insert(row?);
        }
        let mut stmt = conn.prepare("SELECT DISTINCT callee_function FROM function_call_args")?;
        for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
            names.insert(row?);
        }
        Ok(names)
    }

    /// Writes every assignment found in `file`.
    pub fn write_assignments(&self, assignments: &[AssignmentRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO assignments (file, line, target_var, source_expr, in_function, property_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for a in assignments {
                stmt.execute(params![
                    a.file,
                    a.line,
                    a.target_var,
                    a.source_expr,
                    a.in_function,
                    a.property_path,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every assignment recorded in `file`, in insertion order.
    pub fn assignments_for_file(&self, file: &str) -> Result<Vec<AssignmentRow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT file, line, target_var, source_expr, in_function, property_path
             FROM assignments WHERE file = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(AssignmentRow {
                file: row.get(0)?,
                line: row.get::<_, i64>(1)? as usize,
                target_var: row.get(2)?,
                source_expr: row.get(3)?,
                in_function: row.get(4)?,
                property_path: row.get(5)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Writes every call argument found in `file`.
    pub fn write_function_call_args(&self, args: &[FunctionCallArgRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO function_call_args (file, line, callee_function, argument_index, argument_expr)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for a in args {
                stmt.execute(params![
                    a.file,
                    a.line,
                    a.callee_function,
                    a.argument_index,
                    a.argument_expr,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Writes every variable-usage record found in `file`.
    pub fn write_variable_usage(&self, usages: &[VariableUsageRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO variable_usage (file, line, name, usage_kind) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for u in usages {
                stmt.execute(params![u.file, u.line, u.name, u.usage_kind])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every variable-usage record in `file`, in insertion order.
    pub fn variable_usage_for_file(&self, file: &str) -> Result<Vec<VariableUsageRow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT file, line, name, usage_kind FROM variable_usage WHERE file = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(VariableUsageRow {
                file: row.get(0)?,
                line: row.get::<_, i64>(1)? as usize,
                name: row.get(2)?,
                usage_kind: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Returns the union of every textual expression that could reference a
    /// symbol by name: `assignments.source_expr`, `function_call_args.argument_expr`,
    /// and `variable_usage.name`. Dead-symbol detection treats a defined FQN
    /// as reachable if its name appears as a substring of any entry here,
    /// since these columns hold whole expressions rather than bare names.
    pub fn all_referenced_expressions(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut out = Vec::new();
        let mut stmt = conn.prepare("SELECT DISTINCT source_expr FROM assignments")?;
        for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
            out.push(row?);
        }
        let mut stmt =
            conn.prepare("SELECT DISTINCT argument_expr FROM function_call_args WHERE argument_expr IS NOT NULL")?;
        for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
            out.push(row?);
        }
        let mut stmt = conn.prepare("SELECT DISTINCT name FROM variable_usage")?;
        for row in stmt.query_map([], |row| row.get::<_, String>(0))? {
            out.push(row?);
        }
        Ok(out)
    }

    /// Persists a resolved workset's file list under `run_id`, for phases
    /// later in the same run that need the resolved set without
    /// recomputing it from `symbols`/`refs`.
    pub fn write_workset(&self, run_id: &str, paths: &[crate::workset::WorksetPath]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO workset_files (run_id, path, sha256) VALUES (?1, ?2, ?3)")?;
            for p in paths {
                stmt.execute(params![run_id, p.path.to_string_lossy(), p.sha256])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every path recorded for `run_id`, in insertion order.
    pub fn read_workset(&self, run_id: &str) -> Result<Vec<crate::workset::WorksetPath>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT path, sha256 FROM workset_files WHERE run_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(crate::workset::WorksetPath { path: PathBuf::from(row.get::<_, String>(0)?), sha256: row.get(1)? })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Returns every distinct file path with at least one `symbols` row.
    pub fn files_with_symbols(&self) -> Result<std::collections::HashSet<String>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare("SELECT DISTINCT file FROM symbols")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }

    /// Persists the dependency manifest parse. Called once per `full` run
    /// after `deps::collect_dependencies` finishes.
    pub fn write_dependencies(&self, deps: &[DependencyRow]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO dependencies (name, version, manager, source_file, dev_only)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for dep in deps {
                stmt.execute(params![dep.name, dep.version, dep.manager, dep.source_file, dep.dev_only])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every parsed dependency, in insertion order.
    pub fn read_dependencies(&self) -> Result<Vec<DependencyRow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT name, version, manager, source_file, dev_only FROM dependencies ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DependencyRow {
                name: row.get(0)?,
                version: row.get(1)?,
                manager: row.get(2)?,
                source_file: row.get(3)?,
                dev_only: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Persists one phase's framework-detection output. Called once per
    /// `full` run after the Framework Detector finishes.
    pub fn write_framework_records(&self, records: &[FrameworkRecord]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO framework_records (framework, language, directory, version, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for rec in records {
                let source = match &rec.source {
                    DetectionOrigin::Manifest(name) => (*name).to_owned(),
                    DetectionOrigin::Imports => "imports".to_owned(),
                };
                stmt.execute(params![
                    rec.framework,
                    rec.language,
                    rec.directory.to_string_lossy(),
                    rec.version,
                    source,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Appends findings to `findings_consolidated`. Findings are
    /// append-only per run: this never updates or deletes existing rows.
    pub fn write_findings(&self, findings: &[StoredFinding]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO findings_consolidated
                 (file, line, end_line, rule, tool, message, severity, category, cwe, code_snippet, timestamp, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for f in findings {
                #[allow(clippy::cast_possible_wrap)]
                stmt.execute(params![
                    f.file,
                    f.line as i64,
                    f.end_line.map(|l| l as i64),
                    f.rule,
                    f.tool,
                    f.message,
                    f.severity,
                    f.category,
                    f.cwe,
                    f.code_snippet,
                    f.timestamp,
                    f.details,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads back every finding, ordered by primary key (insertion order).
    /// Callers that need the FCE's normalized ordering must sort the
    /// result themselves via `crate::severity::ordering_key`.
    pub fn read_findings(&self) -> Result<Vec<StoredFinding>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT file, line, end_line, rule, tool, message, severity, category, cwe, code_snippet, timestamp, details
             FROM findings_consolidated ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(StoredFinding {
                file: row.get(0)?,
                line: row.get::<_, i64>(1)? as usize,
                end_line: row.get::<_, Option<i64>>(2)?.map(|l| l as usize),
                rule: row.get(3)?,
                tool: row.get(4)?,
                message: row.get(5)?,
                severity: row.get(6)?,
                category: row.get(7)?,
                cwe: row.get(8)?,
                code_snippet: row.get(9)?,
                timestamp: row.get(10)?,
                details: row.get(11)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    /// Records one materialized taint flow.
    pub fn write_taint_flow(&self, flow: &StoredTaintFlow) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            "INSERT INTO taint_flows
             (source_file, source_line, source_pattern, sink_file, sink_line, sink_pattern,
              vulnerability_type, confidence, intermediate_steps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                flow.source_file,
                flow.source_line,
                flow.source_pattern,
                flow.sink_file,
                flow.sink_line,
                flow.sink_pattern,
                flow.vulnerability_type,
                flow.confidence,
                flow.intermediate_steps,
            ],
        )?;
        Ok(())
    }

    /// Reads back every materialized taint flow, in insertion order. Used
    /// by `fce_correlate` to compute the FLOW vector and by `taint_track`'s
    /// own re-runs to avoid re-deriving flows already on disk.
    pub fn read_taint_flows(&self) -> Result<Vec<StoredTaintFlow>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT source_file, source_line, source_pattern, sink_file, sink_line, sink_pattern,
                    vulnerability_type, confidence, intermediate_steps
             FROM taint_flows ORDER BY id",
        )?;
        #[allow(clippy::cast_sign_loss)]
        let rows = stmt.query_map(params![], |row| {
            Ok(StoredTaintFlow {
                source_file: row.get(0)?,
                source_line: row.get::<_, i64>(1)? as usize,
                source_pattern: row.get(2)?,
                sink_file: row.get(3)?,
                sink_line: row.get::<_, i64>(4)? as usize,
                sink_pattern: row.get(5)?,
                vulnerability_type: row.get(6)?,
                confidence: row.get(7)?,
                intermediate_steps: row.get(8)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Injection-safety contract for reads: every path-like parameter is
    /// always bound, never interpolated. This method exists specifically
    /// so that property tests can hand it adversarial input (e.g. a path
    /// containing `'; DROP TABLE findings_consolidated; --`) and assert it
    /// comes back as an empty result rather than altering the store.
    pub fn findings_for_file(&self, file: &str) -> Result<Vec<StoredFinding>, StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT file, line, end_line, rule, tool, message, severity, category, cwe, code_snippet, timestamp, details
             FROM findings_consolidated WHERE file = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file], |row| {
            #[allow(clippy::cast_sign_loss)]
            Ok(StoredFinding {
                file: row.get(0)?,
                line: row.get::<_, i64>(1)? as usize,
                end_line: row.get::<_, Option<i64>>(2)?.map(|l| l as usize),
                rule: row.get(3)?,
                tool: row.get(4)?,
                message: row.get(5)?,
                severity: row.get(6)?,
                category: row.get(7)?,
                cwe: row.get(8)?,
                code_snippet: row.get(9)?,
                timestamp: row.get(10)?,
                details: row.get(11)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }

    /// Writes a generic context-table row (one of the long tail in
    /// [`registry::CONTEXT_FRAMEWORK`] etc). `table` must be one of the
    /// names in that static registry; callers pass it as a `&'static str`
    /// specifically so arbitrary strings can never reach this path.
    pub fn write_context_row(
        &self,
        table: &'static str,
        file: &str,
        line: usize,
        data_json: &str,
    ) -> Result<(), StoreError> {
        debug_assert!(
            is_registered_context_table(table),
            "attempted to write to unregistered context table '{table}'"
        );
        let conn = self.conn.lock().expect("store mutex poisoned");
        conn.execute(
            &format!("INSERT INTO {table} (file, line, data) VALUES (?1, ?2, ?3)"),
            params![file, line, data_json],
        )?;
        Ok(())
    }

    /// Reads back every row written to a context table for one file, in
    /// insertion order. `table` must be one of the registered context
    /// tables; unregistered names return an empty result rather than
    /// querying anything (mirrors the write-side guard).
    pub fn context_rows_for_file(&self, table: &'static str, file: &str) -> Result<Vec<String>, StoreError> {
        if !is_registered_context_table(table) {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(&format!("SELECT data FROM {table} WHERE file = ?1 ORDER BY id"))?;
        let rows = stmt.query_map(params![file], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Truncates the per-run tables (findings, flows, correlations) ahead
    /// of a new run, while preserving extraction tables (`symbols`, `refs`,
    /// `calls`, `assignments`) unless the caller explicitly wipes the
    /// cache (`--wipecache`).
    pub fn truncate_run_tables(&self, wipe_extraction: bool) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        for table in registry::RISK_SOURCES {
            conn.execute(&format!("DELETE FROM {table}"), [])?;
        }
        if wipe_extraction {
            for table in EXTRACTION_RESETTABLE {
                conn.execute(&format!("DELETE FROM {table}"), [])?;
            }
        }
        Ok(())
    }
}

const EXTRACTION_RESETTABLE: &[&str] = &[
    "symbols",
    "refs",
    "calls",
    "assignments",
    "function_call_args",
    "variable_usage",
];

fn is_registered_context_table(table: &str) -> bool {
    registry::CONTEXT_PROCESS.contains(&table)
        || registry::CONTEXT_STRUCTURAL.contains(&table)
        || registry::CONTEXT_FRAMEWORK.contains(&table)
        || registry::CONTEXT_SECURITY.contains(&table)
        || registry::CONTEXT_LANGUAGE.contains(&table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_creates_schema() {
        let store = Store::open_in_memory().expect("open store");
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn findings_round_trip() {
        let store = Store::open_in_memory().expect("open store");
        let finding = StoredFinding::now("api.py", 10, "TA-S101", "theauditor-danger", "msg", "high");
        store.write_findings(std::slice::from_ref(&finding)).expect("write");
        let back = store.read_findings().expect("read");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].file, "api.py");
    }

    #[test]
    fn injection_attempt_in_path_parameter_is_inert() {
        let store = Store::open_in_memory().expect("open store");
        let finding = StoredFinding::now("api.py", 1, "r", "t", "m", "low");
        store.write_findings(std::slice::from_ref(&finding)).expect("write");

        let malicious = "'; DROP TABLE findings_consolidated; --";
        let result = store.findings_for_file(malicious).expect("query should succeed, not error");
        assert!(result.is_empty());

        // The table must still exist and still hold the original row.
        let survives = store.read_findings().expect("table still present");
        assert_eq!(survives.len(), 1);
    }

    #[test]
    fn truncate_preserves_extraction_tables_by_default() {
        let store = Store::open_in_memory().expect("open store");
        let finding = StoredFinding::now("a.py", 1, "r", "t", "m", "low");
        store.write_findings(std::slice::from_ref(&finding)).expect("write finding");
        store
            .write_symbols(Path::new("a.py"), &[])
            .expect("write empty symbol batch");
        store.truncate_run_tables(false).expect("truncate");
        assert!(store.read_findings().expect("read").is_empty());
    }

    #[test]
    fn write_context_row_round_trips() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_context_row("python_decorators", "a.py", 3, r#"{"name":"staticmethod"}"#)
            .expect("write context row");
    }

    #[test]
    fn refs_round_trip_and_aggregate() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_refs(&[RefRow {
                src_file: "a.py".to_owned(),
                kind: "import".to_owned(),
                value: "pkg.utils".to_owned(),
                line: 1,
            }])
            .expect("write refs");
        let back = store.refs_for_file("a.py").expect("read");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].value, "pkg.utils");
        assert!(store.all_ref_values().expect("agg").contains("pkg.utils"));
    }

    #[test]
    fn calls_round_trip_and_aggregate() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_calls(&[CallRow {
                caller_file: "a.py".to_owned(),
                caller_function: Some("main".to_owned()),
                caller_line: 5,
                callee_function: "helper".to_owned(),
                argument_expression: Some("x".to_owned()),
            }])
            .expect("write calls");
        let back = store.calls_for_file("a.py").expect("read");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].callee_function, "helper");
        assert!(store.all_called_function_names().expect("agg").contains("helper"));
    }

    #[test]
    fn assignments_round_trip() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_assignments(&[AssignmentRow {
                file: "a.py".to_owned(),
                line: 2,
                target_var: "x".to_owned(),
                source_expr: "helper()".to_owned(),
                in_function: Some("main".to_owned()),
                property_path: None,
            }])
            .expect("write assignments");
        let back = store.assignments_for_file("a.py").expect("read");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].source_expr, "helper()");
    }

    #[test]
    fn function_call_args_and_variable_usage_feed_referenced_expressions() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_function_call_args(&[FunctionCallArgRow {
                file: "a.py".to_owned(),
                line: 3,
                callee_function: "helper".to_owned(),
                argument_index: 0,
                argument_expr: Some("y".to_owned()),
            }])
            .expect("write args");
        store
            .write_variable_usage(&[VariableUsageRow {
                file: "a.py".to_owned(),
                line: 4,
                name: "y".to_owned(),
                usage_kind: "read".to_owned(),
            }])
            .expect("write usage");
        let back = store.variable_usage_for_file("a.py").expect("read");
        assert_eq!(back.len(), 1);
        let referenced = store.all_referenced_expressions().expect("agg");
        assert!(referenced.iter().any(|e| e == "y"));
    }

    #[test]
    fn files_with_symbols_tracks_every_distinct_file() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_symbols(
                Path::new("a.py"),
                &[SymbolInfo {
                    fqn: "a.foo".to_owned(),
                    file_path: PathBuf::from("a.py"),
                    line: 1,
                    def_type: crate::graph::symbols::SymbolType::Function,
                    params: Vec::new(),
                    module_path: String::new(),
                    is_exported: true,
                    is_entry_point: false,
                    start_byte: 0,
                    end_byte: 0,
                    decorators: Vec::new(),
                    base_classes: Vec::new(),
                }],
            )
            .expect("write symbols");
        let files = store.files_with_symbols().expect("read");
        assert!(files.contains("a.py"));
    }

    #[test]
    fn workset_round_trips_under_its_run_id() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_workset(
                "run-1",
                &[crate::workset::WorksetPath { path: PathBuf::from("a.py"), sha256: "deadbeef".to_owned() }],
            )
            .expect("write workset");
        let back = store.read_workset("run-1").expect("read workset");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].path, PathBuf::from("a.py"));
        assert!(store.read_workset("run-2").expect("read missing run").is_empty());
    }

    #[test]
    fn dependencies_round_trip() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_dependencies(&[DependencyRow {
                name: "requests".to_owned(),
                version: "2.31.0".to_owned(),
                manager: "pip".to_owned(),
                source_file: "requirements.txt".to_owned(),
                dev_only: false,
            }])
            .expect("write deps");
        let back = store.read_dependencies().expect("read deps");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].name, "requests");
        assert!(!back[0].dev_only);
    }

    #[test]
    fn taint_flows_round_trip_in_insertion_order() {
        let store = Store::open_in_memory().expect("open store");
        store
            .write_taint_flow(&StoredTaintFlow {
                source_file: "api.py".to_owned(),
                source_line: 10,
                source_pattern: "request.args".to_owned(),
                sink_file: "api.py".to_owned(),
                sink_line: 15,
                sink_pattern: "db.execute".to_owned(),
                vulnerability_type: "sqli".to_owned(),
                confidence: 0.9,
                intermediate_steps: "[]".to_owned(),
            })
            .expect("write flow");
        let back = store.read_taint_flows().expect("read flows");
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].vulnerability_type, "sqli");
        assert_eq!(back[0].sink_line, 15);
    }
}
