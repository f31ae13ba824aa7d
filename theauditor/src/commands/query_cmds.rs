//! Thin query commands that read back already-indexed state:
//! `deadcode`, `docker-analyze`, `terraform`, `boundaries`, `workflows`,
//! `structure`, `explain`, `rules`, `session analyze`, `report`,
//! `summarize`. None of these run analysis themselves — they open the
//! store `full`/`index` already populated and print a filtered view.

use crate::rules::Rule;
use crate::store::{Store, StoredFinding};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

const EXIT_SUCCESS: i32 = 0;
const EXIT_PREREQUISITE_MISSING: i32 = 3;

fn store_path(root: &Path) -> std::path::PathBuf {
    root.join(".pf").join("repo_index.db")
}

fn open_store_readonly(root: &Path) -> Result<Store, i32> {
    let path = store_path(root);
    if !path.is_file() {
        eprintln!(
            "Error: no indexed store at {}. Run `full` or `index` first.",
            path.display()
        );
        return Err(EXIT_PREREQUISITE_MISSING);
    }
    Store::open(&path).map_err(|e| {
        eprintln!("Error: failed to open store: {e}");
        EXIT_PREREQUISITE_MISSING
    })
}

pub fn run_deadcode<W: Write>(root: &Path, include_tests: bool, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store_readonly(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let findings =
        crate::structural::detect_all(&store, include_tests, &[]).context("detect dead code")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&findings)?)?;
    } else if findings.is_empty() {
        writeln!(writer, "No dead code found.")?;
    } else {
        for f in &findings {
            writeln!(
                writer,
                "[{:?}/{:?}] {}{} - {} ({} symbols)",
                f.kind,
                f.confidence,
                f.path,
                if f.name.is_empty() { String::new() } else { format!("::{}", f.name) },
                f.reason,
                f.symbol_count
            )?;
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Shared body for the four category-filtered finding views
/// (`docker-analyze`/`terraform`/`boundaries`/`workflows`): read every
/// consolidated finding back and keep the ones whose `tool` or `category`
/// contains `needle`.
fn filter_findings_by_needle(findings: &[StoredFinding], needle: &str) -> Vec<StoredFinding> {
    findings
        .iter()
        .filter(|f| {
            f.tool.to_lowercase().contains(needle)
                || f.category.as_deref().is_some_and(|c| c.to_lowercase().contains(needle))
        })
        .cloned()
        .collect()
}

fn print_findings<W: Write>(writer: &mut W, findings: &[StoredFinding], json: bool, empty_msg: &str) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(findings)?)?;
    } else if findings.is_empty() {
        writeln!(writer, "{empty_msg}")?;
    } else {
        for f in findings {
            writeln!(writer, "[{}] {}:{} {} - {}", f.severity, f.file, f.line, f.rule, f.message)?;
        }
    }
    Ok(())
}

fn run_category_view<W: Write>(root: &Path, needle: &str, empty_msg: &str, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store_readonly(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let findings = store.read_findings().context("read findings")?;
    let filtered = filter_findings_by_needle(&findings, needle);
    print_findings(writer, &filtered, json, empty_msg)?;
    Ok(EXIT_SUCCESS)
}

pub fn run_docker_analyze<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    run_category_view(root, "docker", "No docker/container findings.", json, writer)
}

pub fn run_terraform<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    run_category_view(root, "terraform", "No terraform/IaC findings.", json, writer)
}

pub fn run_boundaries<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    run_category_view(root, "boundary", "No cross-framework boundary findings.", json, writer)
}

pub fn run_workflows<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    run_category_view(root, "workflow", "No workflow/CI findings.", json, writer)
}

pub fn run_structure<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store_readonly(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let findings = store.read_findings().context("read findings")?;
    let structural = filter_findings_by_needle(&findings, "structural");
    print_findings(writer, &structural, json, "No structural metrics recorded.")?;
    Ok(EXIT_SUCCESS)
}

pub fn run_explain<W: Write>(root: &Path, file: &Path, min_vectors: usize, json: bool, writer: &mut W) -> Result<i32> {
    let store = match open_store_readonly(root) {
        Ok(s) => s,
        Err(code) => return Ok(code),
    };
    let findings = store.read_findings().context("read findings")?;
    let taint_flows = store.read_taint_flows().context("read taint flows")?;
    let signals = crate::fce::vector::compute_signals(&findings, &taint_flows);
    let points = crate::fce::convergence::cluster(&findings, &signals, min_vectors);

    let file_str = file.to_string_lossy().into_owned();
    let Some(point) = points.into_iter().find(|p| p.file == file_str) else {
        writeln!(writer, "No convergence point found for {file_str} at min_vectors={min_vectors}.")?;
        return Ok(EXIT_SUCCESS);
    };

    let bundle = crate::fce::bundle::assemble(&store, point).context("assemble context bundle")?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&bundle)?)?;
    } else {
        writeln!(
            writer,
            "{} (lines {}-{}, signal {})",
            bundle.point.file,
            bundle.point.line_start,
            bundle.point.line_end,
            bundle.point.signal.code()
        )?;
        for fact in &bundle.point.facts {
            writeln!(writer, "  [{:?}] {}:{} {} ({})", fact.vector, fact.file, fact.line, fact.rule, fact.tool)?;
        }
        for (table, rows) in &bundle.context_layers {
            writeln!(writer, "  context[{table}]: {} row(s)", rows.len())?;
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn run_rules<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let config = crate::config::Config::load_from_path(root);
    let mut rows = Vec::new();
    for r in crate::rules::danger::get_danger_rules() {
        rows.push((r.name(), r.code(), r.category(), "danger"));
    }
    for r in crate::rules::quality::get_quality_rules(&config) {
        rows.push((r.name(), r.code(), r.category(), "quality"));
    }

    let patterns_dir = root.join(".pf").join("patterns");
    let loaded_patterns = crate::patterns::load_patterns_dir(&patterns_dir).unwrap_or_default();

    if json {
        let danger_quality: Vec<_> = rows
            .iter()
            .map(|(name, code, category, kind)| serde_json::json!({"name": name, "code": code, "category": category, "kind": kind}))
            .collect();
        let patterns: Vec<_> = loaded_patterns.iter().map(|p| &p.rule).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&serde_json::json!({"ast_rules": danger_quality, "patterns": patterns}))?)?;
    } else {
        writeln!(writer, "AST-walking rules:")?;
        for (name, code, category, kind) in &rows {
            writeln!(writer, "  [{kind}] {code} {name} ({category})")?;
        }
        writeln!(writer, "Regex patterns ({} loaded from {}):", loaded_patterns.len(), patterns_dir.display())?;
        for p in &loaded_patterns {
            writeln!(writer, "  {} ({}) - {}", p.rule.name, p.rule.category, p.rule.description)?;
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Interface-only: session-log analysis is out of scope. Reads the count
/// of recorded sessions, if any, and stops there rather than scoring them.
pub fn run_session_analyze<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let db_path = root.join(".pf").join("ml").join("session_history.db");
    let present = db_path.is_file();
    // not implemented: diff_scorer / activity_metrics / workflow_checker are out of scope
    if json {
        writeln!(writer, "{}", serde_json::json!({"session_history_present": present}))?;
    } else {
        writeln!(writer, "Session history present: {present}")?;
        writeln!(writer, "Session-log scoring (diff/activity/workflow) is not implemented; this is an interface stub.")?;
    }
    Ok(EXIT_SUCCESS)
}

pub fn run_report<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let path = root.join(".pf").join("raw").join("fce.json");
    if !path.is_file() {
        eprintln!("Error: no FCE report at {}. Run `full` or `fce` first.", path.display());
        return Ok(EXIT_PREREQUISITE_MISSING);
    }
    let body = std::fs::read_to_string(&path).context("read fce.json")?;
    if json {
        writeln!(writer, "{body}")?;
    } else {
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let summary = parsed.get("summary").cloned().unwrap_or(serde_json::Value::Null);
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(EXIT_SUCCESS)
}

pub fn run_summarize<W: Write>(root: &Path, json: bool, writer: &mut W) -> Result<i32> {
    let path = root.join(".pf").join("summary.json");
    if !path.is_file() {
        eprintln!("Error: no summary at {}. Run `full` first.", path.display());
        return Ok(EXIT_PREREQUISITE_MISSING);
    }
    let body = std::fs::read_to_string(&path).context("read summary.json")?;
    if json {
        writeln!(writer, "{body}")?;
    } else {
        writeln!(writer, "{body}")?;
    }
    Ok(EXIT_SUCCESS)
}
