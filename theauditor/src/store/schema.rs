//! DDL for the indexed store. Table names here are a fixed, static list —
//! never user input — so building `CREATE TABLE` statements with
//! `format!` is safe; every *data* write elsewhere in this module uses
//! `rusqlite` parameter binding exclusively.

use super::registry::{
    CONTEXT_FRAMEWORK, CONTEXT_LANGUAGE, CONTEXT_PROCESS, CONTEXT_SECURITY, CONTEXT_STRUCTURAL,
    RISK_SOURCES,
};
use rusqlite::{Connection, Result as SqlResult};

/// Bumped whenever a DDL change would make an older store unreadable by new
/// code. [`super::Store::open`] refuses to proceed on a mismatch.
pub const SCHEMA_VERSION: i64 = 1;

/// Extraction tables: the base facts derived directly from source parsing,
/// written once per run and read by every downstream analyzer.
const EXTRACTION_TABLES: &[&str] = &[
    "symbols",
    "refs",
    "calls",
    "assignments",
    "function_call_args",
    "variable_usage",
    "framework_records",
    "workset_files",
    "dependencies",
];

/// Creates every table the store needs if it doesn't already exist, then
/// records the schema version. Idempotent: safe to call on an existing
/// store whose tables are already present.
pub fn create_all(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS symbols (
            id INTEGER PRIMARY KEY,
            fqn TEXT NOT NULL,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            end_line INTEGER,
            def_type TEXT NOT NULL,
            signature TEXT,
            in_function TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file);
        CREATE INDEX IF NOT EXISTS idx_symbols_fqn ON symbols(fqn);

        CREATE TABLE IF NOT EXISTS refs (
            id INTEGER PRIMARY KEY,
            src_file TEXT NOT NULL,
            kind TEXT NOT NULL,
            value TEXT NOT NULL,
            line INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_refs_value ON refs(value);

        CREATE TABLE IF NOT EXISTS calls (
            id INTEGER PRIMARY KEY,
            caller_file TEXT NOT NULL,
            caller_function TEXT,
            caller_line INTEGER NOT NULL,
            callee_function TEXT NOT NULL,
            argument_expression TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_calls_callee ON calls(callee_function);

        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            target_var TEXT NOT NULL,
            source_expr TEXT NOT NULL,
            in_function TEXT,
            property_path TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_assignments_file ON assignments(file);

        CREATE TABLE IF NOT EXISTS function_call_args (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            callee_function TEXT NOT NULL,
            argument_index INTEGER NOT NULL,
            argument_expr TEXT
        );

        CREATE TABLE IF NOT EXISTS variable_usage (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            name TEXT NOT NULL,
            usage_kind TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS framework_records (
            id INTEGER PRIMARY KEY,
            framework TEXT NOT NULL,
            language TEXT NOT NULL,
            directory TEXT NOT NULL,
            version TEXT,
            source TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dependencies (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            version TEXT NOT NULL,
            manager TEXT NOT NULL,
            source_file TEXT NOT NULL,
            dev_only INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_dependencies_name ON dependencies(name);

        CREATE TABLE IF NOT EXISTS workset_files (
            id INTEGER PRIMARY KEY,
            run_id TEXT NOT NULL,
            path TEXT NOT NULL,
            sha256 TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS findings_consolidated (
            id INTEGER PRIMARY KEY,
            file TEXT NOT NULL,
            line INTEGER NOT NULL,
            end_line INTEGER,
            rule TEXT NOT NULL,
            tool TEXT NOT NULL,
            message TEXT NOT NULL,
            severity TEXT NOT NULL,
            category TEXT,
            cwe TEXT,
            code_snippet TEXT,
            timestamp TEXT NOT NULL,
            details TEXT NOT NULL DEFAULT '{}'
        );
        CREATE INDEX IF NOT EXISTS idx_findings_file_line ON findings_consolidated(file, line);

        CREATE TABLE IF NOT EXISTS taint_flows (
            id INTEGER PRIMARY KEY,
            source_file TEXT NOT NULL,
            source_line INTEGER NOT NULL,
            source_pattern TEXT NOT NULL,
            sink_file TEXT NOT NULL,
            sink_line INTEGER NOT NULL,
            sink_pattern TEXT NOT NULL,
            vulnerability_type TEXT NOT NULL,
            confidence REAL NOT NULL,
            intermediate_steps TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS python_security_findings (
            id INTEGER PRIMARY KEY, file TEXT NOT NULL, line INTEGER NOT NULL,
            rule TEXT NOT NULL, severity TEXT NOT NULL, details TEXT NOT NULL DEFAULT '{}'
        );
        CREATE TABLE IF NOT EXISTS cdk_findings (
            id INTEGER PRIMARY KEY, file TEXT NOT NULL, line INTEGER NOT NULL,
            rule TEXT NOT NULL, severity TEXT NOT NULL, details TEXT NOT NULL DEFAULT '{}'
        );
        CREATE TABLE IF NOT EXISTS terraform_findings (
            id INTEGER PRIMARY KEY, file TEXT NOT NULL, line INTEGER NOT NULL,
            rule TEXT NOT NULL, severity TEXT NOT NULL, details TEXT NOT NULL DEFAULT '{}'
        );
        CREATE TABLE IF NOT EXISTS graphql_findings_cache (
            id INTEGER PRIMARY KEY, file TEXT NOT NULL, line INTEGER NOT NULL,
            rule TEXT NOT NULL, severity TEXT NOT NULL, details TEXT NOT NULL DEFAULT '{}'
        );
        CREATE TABLE IF NOT EXISTS framework_taint_patterns (
            id INTEGER PRIMARY KEY, file TEXT NOT NULL, line INTEGER NOT NULL,
            rule TEXT NOT NULL, severity TEXT NOT NULL, details TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS schema_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;

    for table in CONTEXT_PROCESS
        .iter()
        .chain(CONTEXT_STRUCTURAL)
        .chain(CONTEXT_FRAMEWORK)
        .chain(CONTEXT_SECURITY)
        .chain(CONTEXT_LANGUAGE)
    {
        create_context_table(conn, table)?;
    }

    conn.execute(
        "INSERT INTO schema_meta(key, value) VALUES ('version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Generic layout shared by every context table: a `(file, line, data)` row
/// where `data` is an opaque JSON blob specific to that cluster. This keeps
/// the long tail of per-framework/per-language tables uniform while the
/// handful of tables with real typed write APIs (symbols, findings, taint
/// flows, ...) keep their own columns above.
fn create_context_table(conn: &Connection, table: &str) -> SqlResult<()> {
    debug_assert!(
        table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        "context table name must be a static identifier"
    );
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                file TEXT NOT NULL,
                line INTEGER NOT NULL DEFAULT 0,
                data TEXT NOT NULL DEFAULT '{{}}'
            )"
        ),
        [],
    )?;
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_file ON {table}(file)"),
        [],
    )?;
    Ok(())
}

/// Reads the schema version recorded in an existing store, if any.
pub fn read_version(conn: &Connection) -> SqlResult<Option<i64>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'version'",
        [],
        |row| row.get::<_, String>(0),
    )
    .map(|s| s.parse().ok())
    .or_else(|e| {
        if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            Ok(None)
        } else {
            Err(e)
        }
    })
}

/// Total table count, used by a sanity test to confirm the `≥ 100 tables`
/// budget is met.
#[must_use]
pub fn total_table_count() -> usize {
    EXTRACTION_TABLES.len()
        + RISK_SOURCES.len()
        + CONTEXT_PROCESS.len()
        + CONTEXT_STRUCTURAL.len()
        + CONTEXT_FRAMEWORK.len()
        + CONTEXT_SECURITY.len()
        + CONTEXT_LANGUAGE.len()
}
