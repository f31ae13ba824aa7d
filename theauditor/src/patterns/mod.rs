//! YAML-defined regex pattern engine: the second of the two rule engines
//! described for `rules::` (the first being the AST-walking `Rule` trait
//! impls under `rules::danger`/`rules::quality`). A pattern is a single
//! `regex::Regex` matched line-by-line over the workset, with an optional
//! glob restricting which files it runs against. Grounded on
//! `linter::LinterVisitor`'s line-scanning structure, generalized from an
//! AST walk to a plain text scan since a pattern has no parser to lean on.

pub mod registry;

use crate::store::StoredFinding;
use crate::workset::Workset;
use ignore::overrides::{Override, OverrideBuilder};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternsError {
    #[error("failed to read pattern file {path}: {source}")]
    Read { path: std::path::PathBuf, source: std::io::Error },
    #[error("failed to parse pattern file {path}: {source}")]
    Parse { path: std::path::PathBuf, source: serde_yaml::Error },
    #[error("invalid regex in pattern '{name}': {source}")]
    InvalidRegex { name: String, source: regex::Error },
    #[error("invalid path_filter glob in pattern '{name}': {source}")]
    InvalidGlob { name: String, source: ignore::Error },
}

/// One YAML-declared pattern rule, as written in a patterns directory.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PatternRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub severity: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub regex: String,
    /// Glob restricting which workset files this pattern runs against
    /// (e.g. `"**/*.py"`). `None` matches every file.
    #[serde(default)]
    pub path_filter: Option<String>,
}

fn default_category() -> String {
    "pattern".to_owned()
}

/// A [`PatternRule`] with its regex and path filter pre-compiled, so a scan
/// over many files never recompiles either.
pub struct CompiledPattern {
    pub rule: PatternRule,
    regex: Regex,
    path_filter: Option<Override>,
}

impl CompiledPattern {
    fn compile(rule: PatternRule) -> Result<Self, PatternsError> {
        let regex = Regex::new(&rule.regex)
            .map_err(|source| PatternsError::InvalidRegex { name: rule.name.clone(), source })?;
        let path_filter = match &rule.path_filter {
            None => None,
            Some(glob) => {
                let mut builder = OverrideBuilder::new(".");
                builder
                    .add(glob)
                    .map_err(|source| PatternsError::InvalidGlob { name: rule.name.clone(), source })?;
                Some(
                    builder
                        .build()
                        .map_err(|source| PatternsError::InvalidGlob { name: rule.name.clone(), source })?,
                )
            }
        };
        Ok(Self { rule, regex, path_filter })
    }

    fn matches_path(&self, relative_path: &Path) -> bool {
        match &self.path_filter {
            None => true,
            Some(ov) => matches!(ov.matched(relative_path, false), ignore::Match::Whitelist(_)),
        }
    }
}

/// Loads every `*.yml`/`*.yaml` file directly under `dir`, each holding a
/// top-level YAML sequence of [`PatternRule`]. Missing `dir` yields an
/// empty pattern set rather than an error — a project with no custom
/// patterns still runs the rest of the pipeline.
pub fn load_patterns_dir(dir: &Path) -> Result<Vec<CompiledPattern>, PatternsError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut compiled = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|source| PatternsError::Read { path: dir.to_path_buf(), source })?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("yml" | "yaml")))
        .collect();
    entries.sort();

    for path in entries {
        let contents =
            std::fs::read_to_string(&path).map_err(|source| PatternsError::Read { path: path.clone(), source })?;
        let rules: Vec<PatternRule> = serde_yaml::from_str(&contents)
            .map_err(|source| PatternsError::Parse { path: path.clone(), source })?;
        for rule in rules {
            compiled.push(CompiledPattern::compile(rule)?);
        }
    }
    Ok(compiled)
}

/// Runs every compiled pattern over every file in `workset`, relative to
/// `root`. A pattern with a `path_filter` only scans matching files. Each
/// matching line becomes one [`StoredFinding`] tagged `tool:
/// "pattern-detector"`, `rule` set to the pattern's name.
#[must_use]
pub fn scan_workset(patterns: &[CompiledPattern], root: &Path, workset: &Workset) -> Vec<StoredFinding> {
    let mut findings = Vec::new();
    for entry in &workset.paths {
        let applicable: Vec<&CompiledPattern> =
            patterns.iter().filter(|p| p.matches_path(&entry.path)).collect();
        if applicable.is_empty() {
            continue;
        }
        let full_path = root.join(&entry.path);
        let Ok(contents) = std::fs::read_to_string(&full_path) else { continue };
        for (idx, line) in contents.lines().enumerate() {
            for pattern in &applicable {
                if pattern.regex.is_match(line) {
                    let mut finding = StoredFinding::now(
                        entry.path.to_string_lossy().into_owned(),
                        idx + 1,
                        pattern.rule.name.clone(),
                        "pattern-detector",
                        pattern.rule.description.clone(),
                        pattern.rule.severity.clone(),
                    );
                    finding.category = Some(pattern.rule.category.clone());
                    finding.code_snippet = Some(line.trim().to_owned());
                    findings.push(finding);
                }
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workset::{Seed, WorksetPath};

    fn sample_workset(path: &str) -> Workset {
        Workset {
            generated_at: "2026-01-01T00:00:00Z".to_owned(),
            root: std::path::PathBuf::from("."),
            seed: Seed::All,
            max_depth: 0,
            seed_file_count: 1,
            expanded_file_count: 1,
            paths: vec![WorksetPath { path: std::path::PathBuf::from(path), sha256: String::new() }],
        }
    }

    #[test]
    fn load_patterns_dir_returns_empty_for_missing_dir() {
        let patterns = load_patterns_dir(Path::new("/nonexistent/patterns")).expect("load");
        assert!(patterns.is_empty());
    }

    #[test]
    fn compiled_pattern_respects_path_filter() {
        let rule = PatternRule {
            name: "no-eval".to_owned(),
            description: "flags eval calls".to_owned(),
            severity: "high".to_owned(),
            category: "danger".to_owned(),
            regex: r"eval\(".to_owned(),
            path_filter: Some("**/*.py".to_owned()),
        };
        let compiled = CompiledPattern::compile(rule).expect("compile");
        assert!(compiled.matches_path(Path::new("a.py")));
        assert!(!compiled.matches_path(Path::new("a.rs")));
    }

    #[test]
    fn scan_workset_emits_one_finding_per_matching_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "x = eval(user_input)\ny = 1\n").expect("write");

        let rule = PatternRule {
            name: "no-eval".to_owned(),
            description: "flags eval calls".to_owned(),
            severity: "high".to_owned(),
            category: "danger".to_owned(),
            regex: r"eval\(".to_owned(),
            path_filter: None,
        };
        let compiled = vec![CompiledPattern::compile(rule).expect("compile")];
        let workset = sample_workset("a.py");

        let findings = scan_workset(&compiled, dir.path(), &workset);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[0].tool, "pattern-detector");
    }
}
