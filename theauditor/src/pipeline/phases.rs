//! Concrete `PhaseOperation` implementations for the fixed phase inventory
//! (spec §4.9). Each phase wraps one existing in-process analyzer and
//! persists its output through the [`crate::store::Store`] API; none of
//! them shell out to a subprocess, so their `run` bodies are ordinary
//! in-process calls rather than the process-spawn pattern used elsewhere in
//! this crate's CLI commands.

use super::context::PhaseContext;
use super::phase::{resolve_timeout, PhaseError, PhaseOperation, PhaseOutcome, DEFAULT_FCE_TIMEOUT, DEFAULT_LINTER_TIMEOUT};
use crate::analyzer::semantic::graph::EdgeType;
use crate::analyzer::semantic::{SemanticAnalyzer, SemanticConfig};
use crate::rules::Finding as RuleFinding;
use crate::store::{AssignmentRow, CallRow, DependencyRow, RefRow, StoredFinding, StoredTaintFlow};
use crate::workset::{ResolveOptions, Seed, Workset};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Walks `root` with the same ignore/gitignore rules used elsewhere in the
/// crate (`framework::detector`, `deps`) and returns every file path,
/// relative to `root`. Used to build the workset resolver's manifest and
/// the ref graph, both of which need every file, not just Python ones.
fn walk_repo_relative_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = ignore::WalkBuilder::new(root).hidden(false).git_ignore(true).build();
    for entry in walker.flatten() {
        if entry.file_type().is_some_and(|t| t.is_file()) {
            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }
    }
    files
}

fn io_error(name: &'static str, err: impl std::fmt::Display) -> PhaseError {
    PhaseError::new(format!("{name}: {err}"), 1)
}

// ---------------------------------------------------------------------
// Stage 1: Index & detect
// ---------------------------------------------------------------------

/// Builds the project's symbol table and import/call graph via
/// [`SemanticAnalyzer`], then persists every symbol and every resolved
/// edge into `symbols`/`refs`/`calls`. `assignments` is populated from the
/// same per-file `TheAuditorVisitor` pass the legacy `stats`/`cc` commands
/// already drive (see `analyzer::single_file`), generalized here to every
/// file in the workset rather than one at a time.
pub struct IndexBuild;

impl PhaseOperation for IndexBuild {
    fn name(&self) -> &'static str {
        "index_build"
    }

    fn writes(&self) -> &'static [&'static str] {
        &["symbols", "refs", "calls", "assignments"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let config = SemanticConfig {
            project_root: ctx.root().to_path_buf(),
            include_tests: true,
            exclude_folders: Vec::new(),
            enable_taint: false,
            enable_fix: false,
        };
        let analyzer = SemanticAnalyzer::new(config);
        analyzer
            .analyze(&[ctx.root().to_path_buf()])
            .map_err(|e| io_error("semantic analysis failed", e))?;

        let symbols = analyzer.symbol_table();
        let mut by_file: FxHashMap<PathBuf, Vec<crate::graph::symbols::SymbolInfo>> = FxHashMap::default();
        for entry in symbols.iter() {
            by_file.entry(entry.value().file_path.clone()).or_default().push(entry.value().clone());
        }
        for (file, syms) in &by_file {
            ctx.store().write_symbols(file, syms).map_err(|e| io_error("write_symbols", e))?;
        }

        let mut refs = Vec::new();
        let mut calls = Vec::new();
        for (src_fqn, dst_fqn, edge_type) in analyzer.graph_edges() {
            let src_file = symbols.get(&src_fqn).map(|s| s.file_path.to_string_lossy().into_owned());
            match edge_type {
                EdgeType::Imports | EdgeType::References => {
                    if let Some(src_file) = src_file {
                        refs.push(RefRow { src_file, kind: "import".to_owned(), value: dst_fqn, line: 0 });
                    }
                }
                EdgeType::Calls => {
                    calls.push(CallRow {
                        caller_file: src_file.unwrap_or_default(),
                        caller_function: Some(src_fqn),
                        caller_line: 0,
                        callee_function: dst_fqn,
                        argument_expression: None,
                    });
                }
                EdgeType::Inherits => {
                    if let Some(src_file) = src_file {
                        refs.push(RefRow { src_file, kind: "inherits".to_owned(), value: dst_fqn, line: 0 });
                    }
                }
            }
        }
        if !refs.is_empty() {
            ctx.store().write_refs(&refs).map_err(|e| io_error("write_refs", e))?;
        }
        if !calls.is_empty() {
            ctx.store().write_calls(&calls).map_err(|e| io_error("write_calls", e))?;
        }

        // assignments: a lightweight pass over every collected file's
        // top-level `target = source` statements, reusing the same
        // `ruff_python_parser` entry point `single_file.rs` uses.
        let assignments = extract_assignments(&by_file.keys().cloned().collect::<Vec<_>>());
        if !assignments.is_empty() {
            ctx.store().write_assignments(&assignments).map_err(|e| io_error("write_assignments", e))?;
        }

        Ok(PhaseOutcome { findings_count: by_file.values().map(Vec::len).sum(), ..Default::default() })
    }
}

/// Extracts simple `name = expr` assignments from every file's top-level
/// and function-body statements, for the `assignments` table. This is
/// deliberately shallow (no destructuring, no augmented assignment)
/// compared to `TheAuditorVisitor`'s full def/ref tracking; deeper
/// extraction belongs to that visitor, not to index construction.
fn extract_assignments(files: &[PathBuf]) -> Vec<AssignmentRow> {
    use crate::utils::LineIndex;
    use ruff_python_ast::{Expr, ExceptHandler, Stmt};

    fn walk(stmts: &[Stmt], file: &str, in_function: Option<&str>, line_index: &LineIndex, out: &mut Vec<AssignmentRow>) {
        for stmt in stmts {
            match stmt {
                Stmt::Assign(assign) => {
                    let line = line_index.line_index(assign.range.start());
                    for target in &assign.targets {
                        if let Expr::Name(name) = target {
                            out.push(AssignmentRow {
                                file: file.to_owned(),
                                line,
                                target_var: name.id.to_string(),
                                source_expr: expr_to_text(&assign.value),
                                in_function: in_function.map(str::to_owned),
                                property_path: None,
                            });
                        }
                    }
                }
                Stmt::FunctionDef(f) => walk(&f.body, file, Some(f.name.as_str()), line_index, out),
                Stmt::ClassDef(c) => walk(&c.body, file, in_function, line_index, out),
                Stmt::If(s) => {
                    walk(&s.body, file, in_function, line_index, out);
                    for clause in &s.elif_else_clauses {
                        walk(&clause.body, file, in_function, line_index, out);
                    }
                }
                Stmt::For(s) => walk(&s.body, file, in_function, line_index, out),
                Stmt::While(s) => walk(&s.body, file, in_function, line_index, out),
                Stmt::With(s) => walk(&s.body, file, in_function, line_index, out),
                Stmt::Try(s) => {
                    walk(&s.body, file, in_function, line_index, out);
                    for handler in &s.handlers {
                        match handler {
                            ExceptHandler::ExceptHandler(h) => walk(&h.body, file, in_function, line_index, out),
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn expr_to_text(expr: &ruff_python_ast::Expr) -> String {
        use ruff_python_ast::Expr;
        match expr {
            Expr::Name(n) => n.id.to_string(),
            Expr::Call(call) => format!("{}(...)", expr_to_text(&call.func)),
            Expr::Attribute(attr) => format!("{}.{}", expr_to_text(&attr.value), attr.attr.as_str()),
            Expr::StringLiteral(_) => "<str>".to_owned(),
            Expr::NumberLiteral(_) => "<num>".to_owned(),
            _ => "<expr>".to_owned(),
        }
    }

    let mut out = Vec::new();
    for file in files {
        let Ok(source) = std::fs::read_to_string(file) else { continue };
        let Ok(parsed) = ruff_python_parser::parse_module(&source) else { continue };
        let line_index = LineIndex::new(&source);
        walk(&parsed.into_syntax().body, &file.to_string_lossy(), None, &line_index, &mut out);
    }
    out
}

/// Runs `framework::detect_frameworks` and persists every record.
pub struct FrameworkDetect;

impl PhaseOperation for FrameworkDetect {
    fn name(&self) -> &'static str {
        "framework_detect"
    }

    fn writes(&self) -> &'static [&'static str] {
        &["framework_records"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(Duration::from_secs(60))
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let records = crate::framework::detect_frameworks(ctx.root());
        let count = records.len();
        ctx.store().write_framework_records(&records).map_err(|e| io_error("write_framework_records", e))?;
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

/// Runs `deps::collect_dependencies` and persists every manifest entry.
pub struct DepsParse;

impl PhaseOperation for DepsParse {
    fn name(&self) -> &'static str {
        "deps_parse"
    }

    fn writes(&self) -> &'static [&'static str] {
        &["dependencies"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(Duration::from_secs(60))
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let deps = crate::deps::collect_dependencies(ctx.root());
        let rows: Vec<DependencyRow> = deps
            .into_iter()
            .map(|d| DependencyRow {
                name: d.name,
                version: d.version,
                manager: d.manager.to_owned(),
                source_file: d.source_file.to_string_lossy().into_owned(),
                dev_only: d.dev_only,
            })
            .collect();
        let count = rows.len();
        ctx.store().write_dependencies(&rows).map_err(|e| io_error("write_dependencies", e))?;
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

// ---------------------------------------------------------------------
// Stage 2: Resolve & prepare
// ---------------------------------------------------------------------

/// A single pipeline invocation resolves exactly one workset; this crate
/// doesn't yet model concurrent runs sharing one store, so every run writes
/// under the same fixed id rather than generating a fresh one per call.
const CURRENT_RUN_ID: &str = "current";

/// Resolves the run's workset (every file, by default) from `symbols`/
/// `refs`, expanded through the ref graph, and persists it to
/// `workset_files` under [`CURRENT_RUN_ID`] for later phases to read back.
pub struct WorksetBuild;

impl PhaseOperation for WorksetBuild {
    fn name(&self) -> &'static str {
        "workset_build"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["symbols", "refs"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["workset_files"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(Duration::from_secs(60))
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let workset = build_workset(ctx).map_err(|e| io_error("workset resolution failed", e))?;
        let count = workset.paths.len();
        ctx.store().write_workset(CURRENT_RUN_ID, &workset.paths).map_err(|e| io_error("write_workset", e))?;
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

/// Shared by `workset_build`, `lint_orchestrate`, and `pattern_engine`: all
/// three need the same resolved file list and none of them mutate it.
/// Prefers the set `workset_build` already persisted under
/// [`CURRENT_RUN_ID`]; falls back to a fresh resolution so each of these
/// phases still works when invoked on its own (e.g. in tests) rather than
/// as part of the full four-stage pipeline.
fn build_workset(ctx: &PhaseContext) -> Result<Workset, crate::workset::WorksetError> {
    if let Ok(persisted) = ctx.store().read_workset(CURRENT_RUN_ID) {
        if !persisted.is_empty() {
            return Ok(Workset {
                generated_at: String::new(),
                root: ctx.root().to_path_buf(),
                seed: Seed::All,
                max_depth: 0,
                seed_file_count: persisted.len(),
                expanded_file_count: persisted.len(),
                paths: persisted,
            });
        }
    }

    let manifest = walk_repo_relative_files(ctx.root());
    let mut graph = crate::workset::RefGraph::new();
    for file in &manifest {
        if let Ok(rows) = ctx.store().refs_for_file(&file.to_string_lossy()) {
            for row in rows {
                if let Some(target) =
                    crate::workset::resolve_specifier(file, &row.value, &manifest.iter().cloned().collect())
                {
                    graph.add_edge(file.clone(), target);
                }
            }
        }
    }
    crate::workset::resolve(ctx.root(), Seed::All, &manifest, &graph, &ResolveOptions::default())
}

/// Runs the AST-walking `Rule` trait rules (`rules::danger`,
/// `rules::quality`) plus `rules::secrets` over every workset file,
/// mirroring `analyzer::single_file::process_single_file`'s per-file
/// rule-driving but generalized across the whole resolved workset instead
/// of one file passed in by the caller.
pub struct LintOrchestrate;

impl PhaseOperation for LintOrchestrate {
    fn name(&self) -> &'static str {
        "lint_orchestrate"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["workset_files"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["findings_lint"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let workset = build_workset(ctx).map_err(|e| io_error("workset resolution failed", e))?;
        let config = crate::config::Config::default();
        let mut findings = Vec::new();

        for entry in &workset.paths {
            if entry.path.extension().is_none_or(|e| e != "py") {
                continue;
            }
            let full_path = ctx.root().join(&entry.path);
            let Ok(source) = std::fs::read_to_string(&full_path) else { continue };
            let Ok(parsed) = ruff_python_parser::parse_module(&source) else { continue };
            let module = parsed.into_syntax();

            let secrets = crate::rules::secrets::scan_secrets(
                &source,
                &entry.path.to_path_buf(),
                &config.theauditor.secrets_config,
                None,
            );
            for secret in secrets {
                findings.push(StoredFinding::now(
                    entry.path.to_string_lossy().into_owned(),
                    secret.line,
                    secret.rule_id,
                    "secrets-scanner",
                    secret.message,
                    secret.severity,
                ));
            }

            let mut rules: Vec<Box<dyn crate::rules::Rule>> = Vec::new();
            rules.extend(crate::rules::danger::get_danger_rules());
            rules.extend(crate::rules::quality::get_quality_rules(&config));

            let line_index = crate::utils::LineIndex::new(&source);
            let mut linter = crate::linter::LinterVisitor::new(rules, entry.path.clone(), line_index, config.clone());
            for stmt in &module.body {
                linter.visit_stmt(stmt);
            }
            for finding in linter.findings {
                findings.push(rule_finding_to_stored(&entry.path, &finding));
            }

            if ctx.cancelled() {
                break;
            }
        }

        let count = findings.len();
        if !findings.is_empty() {
            ctx.store().write_findings(&findings).map_err(|e| io_error("write_findings", e))?;
        }
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

fn rule_finding_to_stored(path: &Path, finding: &RuleFinding) -> StoredFinding {
    let mut stored = StoredFinding::now(
        path.to_string_lossy().into_owned(),
        finding.line,
        finding.rule_id.clone(),
        "theauditor-lint",
        finding.message.clone(),
        finding.severity.clone(),
    );
    stored.category = Some(finding.category.clone());
    stored
}

// ---------------------------------------------------------------------
// Stage 3: Analyze
// ---------------------------------------------------------------------

/// Runs the YAML pattern engine (`patterns::`) over the resolved workset.
/// Independent of `taint_track`/`structural_analyze` (disjoint writes), so
/// the scheduler runs all three on separate tracks within this stage.
pub struct PatternEngine;

impl PhaseOperation for PatternEngine {
    fn name(&self) -> &'static str {
        "pattern_engine"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["workset_files"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["findings_pattern"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let workset = build_workset(ctx).map_err(|e| io_error("workset resolution failed", e))?;
        let patterns_dir = ctx.root().join(".pf").join("patterns");
        let compiled = crate::patterns::load_patterns_dir(&patterns_dir).map_err(|e| io_error("load_patterns_dir", e))?;
        if compiled.is_empty() {
            return Ok(PhaseOutcome::default());
        }
        let findings = crate::patterns::scan_workset(&compiled, ctx.root(), &workset);
        let count = findings.len();
        if !findings.is_empty() {
            ctx.store().write_findings(&findings).map_err(|e| io_error("write_findings", e))?;
        }
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

/// Runs `taint::TaintAnalyzer` across every Python file already indexed
/// into `symbols`, materializing each finding as a `taint_flows` row. Reads
/// `calls`/`assignments` only to the extent they're already captured by
/// `index_build`; the taint analyzer does its own intraprocedural parse
/// rather than replaying the store's rows, since it needs the live AST.
pub struct TaintTrack;

impl PhaseOperation for TaintTrack {
    fn name(&self) -> &'static str {
        "taint_track"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["symbols", "calls", "assignments"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["taint_flows"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let files_with_symbols = ctx.store().files_with_symbols().map_err(|e| io_error("files_with_symbols", e))?;
        let mut sources = Vec::new();
        for file in &files_with_symbols {
            let path = ctx.root().join(file);
            if let Ok(source) = std::fs::read_to_string(&path) {
                sources.push((PathBuf::from(file), source));
            }
        }

        let mut analyzer = crate::taint::TaintAnalyzer::new(crate::taint::analyzer::TaintConfig::all_levels());
        let findings = analyzer.analyze_project(&sources);
        let count = findings.len();

        for finding in &findings {
            let flow = StoredTaintFlow {
                source_file: finding.file.to_string_lossy().into_owned(),
                source_line: finding.source_line,
                source_pattern: finding.source.clone(),
                sink_file: finding.file.to_string_lossy().into_owned(),
                sink_line: finding.sink_line,
                sink_pattern: finding.sink.clone(),
                vulnerability_type: format!("{:?}", finding.vuln_type),
                confidence: 1.0,
                intermediate_steps: serde_json::to_string(&finding.flow_path).unwrap_or_else(|_| "[]".to_owned()),
            };
            ctx.store().write_taint_flow(&flow).map_err(|e| io_error("write_taint_flow", e))?;
        }
        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

/// Runs `structural::detect_all` (dead-module/function/class detection)
/// and a lightweight per-file complexity/centrality pass, persisting dead
/// code as findings and the metrics as context rows.
pub struct StructuralAnalyze;

impl PhaseOperation for StructuralAnalyze {
    fn name(&self) -> &'static str {
        "structural_analyze"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["symbols", "refs", "calls"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["findings_structural", "structural_centrality", "structural_cyclomatic"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_LINTER_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let dead = crate::structural::detect_all(ctx.store(), false, &[]).map_err(|e| io_error("detect_all", e))?;
        let findings: Vec<StoredFinding> = dead
            .iter()
            .map(|f| {
                let mut sf = StoredFinding::now(
                    f.path.clone(),
                    f.line.max(1),
                    format!("dead-{:?}", f.kind).to_lowercase(),
                    "structural-analyzer",
                    crate::structural::explain::describe(f),
                    match f.confidence {
                        crate::structural::Confidence::High => "medium",
                        crate::structural::Confidence::Medium | crate::structural::Confidence::Low => "low",
                    },
                );
                sf.category = Some("dead-code".to_owned());
                sf
            })
            .collect();
        let count = findings.len();
        if !findings.is_empty() {
            ctx.store().write_findings(&findings).map_err(|e| io_error("write_findings", e))?;
        }

        for file in ctx.store().files_with_symbols().map_err(|e| io_error("files_with_symbols", e))? {
            let full_path = ctx.root().join(&file);
            if let Ok(source) = std::fs::read_to_string(&full_path) {
                if let Some(cyclomatic) = crate::complexity::calculate_module_complexity(&source) {
                    let data = serde_json::json!({ "complexity": cyclomatic }).to_string();
                    ctx.store()
                        .write_context_row("structural_cyclomatic", &file, 0, &data)
                        .map_err(|e| io_error("write_context_row(structural_cyclomatic)", e))?;
                }
            }
            let in_degree = ctx.store().refs_for_file(&file).map(|r| r.len()).unwrap_or(0);
            let out_degree = ctx.store().calls_for_file(&file).map(|c| c.len()).unwrap_or(0);
            let data = serde_json::json!({ "in_degree": in_degree, "out_degree": out_degree }).to_string();
            ctx.store()
                .write_context_row("structural_centrality", &file, 0, &data)
                .map_err(|e| io_error("write_context_row(structural_centrality)", e))?;
        }

        Ok(PhaseOutcome { findings_count: count, ..Default::default() })
    }
}

// ---------------------------------------------------------------------
// Stage 4: Correlate & report
// ---------------------------------------------------------------------

/// Runs the seven-step FCE correlation algorithm and persists the
/// consolidated report's correlation matches are derived fresh each call
/// (not re-persisted; `findings_consolidated` already holds every finding
/// `correlate` reads back). Correlation rules are loaded from
/// `.pf/correlation_rules.yml` if present, empty otherwise.
pub struct FceCorrelate;

impl PhaseOperation for FceCorrelate {
    fn name(&self) -> &'static str {
        "fce_correlate"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["findings_lint", "findings_pattern", "findings_structural", "taint_flows"]
    }

    fn writes(&self) -> &'static [&'static str] {
        &["findings_consolidated"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(DEFAULT_FCE_TIMEOUT)
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let symbols = ctx.store().load_symbol_table().map_err(|e| io_error("load_symbol_table", e))?;
        let taint_flows = ctx.store().read_taint_flows().map_err(|e| io_error("read_taint_flows", e))?;
        let rules_path = ctx.root().join(".pf").join("correlation_rules.yml");
        let rules = crate::fce::rules::load_from_file(&rules_path).map_err(|e| io_error("load_from_file", e))?;

        let report = crate::fce::correlate(ctx.store(), &symbols, &taint_flows, &rules, 2)
            .map_err(|e| io_error("fce::correlate", e))?;

        Ok(PhaseOutcome {
            findings_count: report.summary.total_findings,
            stdout: serde_json::to_string(&report.summary).unwrap_or_default(),
            ..Default::default()
        })
    }
}

/// Computes the human-readable summary and writes it to `.pf/summary.json`.
pub struct Summarize;

impl PhaseOperation for Summarize {
    fn name(&self) -> &'static str {
        "summarize"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["findings_consolidated"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(Duration::from_secs(30))
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let symbols = ctx.store().load_symbol_table().map_err(|e| io_error("load_symbol_table", e))?;
        let taint_flows = ctx.store().read_taint_flows().map_err(|e| io_error("read_taint_flows", e))?;
        let report =
            crate::fce::correlate(ctx.store(), &symbols, &taint_flows, &[], 2).map_err(|e| io_error("fce::correlate", e))?;
        let summary_json = serde_json::to_string_pretty(&report.summary).unwrap_or_default();

        let pf_dir = ctx.root().join(".pf");
        std::fs::create_dir_all(&pf_dir).map_err(|e| io_error("create .pf dir", e))?;
        std::fs::write(pf_dir.join("summary.json"), &summary_json).map_err(|e| io_error("write summary.json", e))?;

        Ok(PhaseOutcome { findings_count: report.summary.total_findings, stdout: summary_json, ..Default::default() })
    }
}

/// Chunks the consolidated findings into `.pf/readthis/*.json` via
/// `chunker::chunk`.
pub struct ChunkReport;

impl PhaseOperation for ChunkReport {
    fn name(&self) -> &'static str {
        "chunk_report"
    }

    fn reads(&self) -> &'static [&'static str] {
        &["findings_consolidated"]
    }

    fn timeout(&self) -> Duration {
        resolve_timeout(Duration::from_secs(30))
    }

    fn run(&self, ctx: &PhaseContext) -> Result<PhaseOutcome, PhaseError> {
        let findings = ctx.store().read_findings().map_err(|e| io_error("read_findings", e))?;
        let unit = crate::chunker::Unit::from_serializable("findings", &findings);
        let chunks = crate::chunker::chunk(&[unit], crate::chunker::DEFAULT_CHUNK_BYTE_BUDGET);

        let readthis_dir = ctx.root().join(".pf").join("readthis");
        std::fs::create_dir_all(&readthis_dir).map_err(|e| io_error("create readthis dir", e))?;
        for c in &chunks {
            let path = readthis_dir.join(format!("chunk_{:03}.json", c.chunk_number));
            let json = serde_json::to_string_pretty(c).unwrap_or_default();
            std::fs::write(path, json).map_err(|e| io_error("write chunk", e))?;
        }

        Ok(PhaseOutcome { findings_count: findings.len(), ..Default::default() })
    }
}

/// Assembles the four fixed stages with their concrete phases, in the
/// order spec §4.9 describes.
#[must_use]
pub fn build_stages() -> Vec<super::stage::Stage> {
    vec![
        super::stage::Stage::new(
            "Index & detect",
            1,
            vec![Box::new(IndexBuild), Box::new(FrameworkDetect), Box::new(DepsParse)],
        ),
        super::stage::Stage::new("Resolve & prepare", 2, vec![Box::new(WorksetBuild), Box::new(LintOrchestrate)]),
        super::stage::Stage::new(
            "Analyze",
            3,
            vec![Box::new(PatternEngine), Box::new(TaintTrack), Box::new(StructuralAnalyze)],
        ),
        super::stage::Stage::new(
            "Correlate & report",
            4,
            vec![Box::new(FceCorrelate), Box::new(Summarize), Box::new(ChunkReport)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_stages_has_four_stages_in_spec_order() {
        let stages = build_stages();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0].name, "Index & detect");
        assert_eq!(stages[3].name, "Correlate & report");
    }

    #[test]
    fn walk_repo_relative_files_finds_a_created_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "x = 1\n").expect("write");
        let files = walk_repo_relative_files(dir.path());
        assert!(files.iter().any(|f| f == Path::new("a.py")));
    }
}
