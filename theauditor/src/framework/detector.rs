//! Framework Detector: walks a repository and turns the static
//! [`super::registry::FRAMEWORK_REGISTRY`] catalog into concrete records of
//! which frameworks are used, where, and at what version.
//!
//! Detection order per directory: manifest-based sources first (a concrete
//! version always wins), then a source-scan fallback for any entry whose
//! import patterns appear in that directory's files but whose manifest
//! never matched.

use super::registry::{DetectionSource, FrameworkEntry, FRAMEWORK_REGISTRY};
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories never descended into regardless of `.gitignore` state.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".venv",
    "venv",
    "vendor",
    "build",
    "dist",
    "target",
    ".git",
    "__pycache__",
];

/// How a framework's presence in a given directory was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOrigin {
    /// Found via a manifest file, named here (e.g. `"package.json"`).
    Manifest(&'static str),
    /// Found only via source-level import pattern matching.
    Imports,
}

/// One detected (framework, language, directory) triple.
#[derive(Debug, Clone)]
pub struct FrameworkRecord {
    /// Canonical framework name from the registry.
    pub framework: &'static str,
    /// Implementation language.
    pub language: &'static str,
    /// Directory the manifest or source files were found in.
    pub directory: PathBuf,
    /// Resolved version, or `None` if only presence/imports were detected.
    pub version: Option<String>,
    /// How this record was established.
    pub source: DetectionOrigin,
    /// Category tag carried over from the registry entry, if any.
    pub category: Option<&'static str>,
}

/// Walks `root`, applying every registry entry to every manifest file found,
/// then falls back to import-pattern scanning for anything left undetected.
#[must_use]
pub fn detect_frameworks(root: &Path) -> Vec<FrameworkRecord> {
    let mut records: HashMap<(&'static str, PathBuf), FrameworkRecord> = HashMap::new();
    let mut workspace_cache: HashMap<PathBuf, Option<toml::Value>> = HashMap::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !EXCLUDED_DIRS.contains(&name))
        })
        .build();

    for entry in walker.filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(dir) = path.parent() else { continue };

        for entry_def in FRAMEWORK_REGISTRY {
            for (manifest_name, source) in entry_def.detection_sources {
                if *manifest_name != file_name {
                    continue;
                }
                if let Some(detected) =
                    apply_source(path, entry_def, source, &mut workspace_cache)
                {
                    upsert(&mut records, dir, entry_def, detected, manifest_name);
                }
            }
        }
    }

    scan_imports(root, &mut records);

    let mut out: Vec<FrameworkRecord> = records.into_values().collect();
    out.sort_by(|a, b| {
        a.framework
            .cmp(b.framework)
            .then_with(|| a.directory.cmp(&b.directory))
    });
    out
}

/// Inserts or upgrades a record: a concrete version always supersedes
/// `unknown`, and a manifest source always supersedes an import-only one.
fn upsert(
    records: &mut HashMap<(&'static str, PathBuf), FrameworkRecord>,
    dir: &Path,
    entry_def: &'static FrameworkEntry,
    version: Option<String>,
    manifest_name: &'static str,
) {
    let key = (entry_def.name, dir.to_path_buf());
    records
        .entry(key)
        .and_modify(|existing| {
            if existing.version.is_none() && version.is_some() {
                existing.version.clone_from(&version);
                existing.source = DetectionOrigin::Manifest(manifest_name);
            }
        })
        .or_insert_with(|| FrameworkRecord {
            framework: entry_def.name,
            language: entry_def.language,
            directory: dir.to_path_buf(),
            version,
            source: DetectionOrigin::Manifest(manifest_name),
            category: entry_def.category,
        });
}

/// Applies a single detection source against one manifest file, returning
/// the resolved version string if the framework was found there.
fn apply_source(
    path: &Path,
    entry_def: &FrameworkEntry,
    source: &DetectionSource,
    workspace_cache: &mut HashMap<PathBuf, Option<toml::Value>>,
) -> Option<Option<String>> {
    match source {
        DetectionSource::Exists => Some(None),
        DetectionSource::KeyPaths(paths) => {
            detect_via_key_paths(path, entry_def, paths, workspace_cache)
        }
        DetectionSource::ContentSearch => detect_via_content_search(path, entry_def),
        DetectionSource::LineSearch => detect_via_line_search(path, entry_def),
    }
}

/// Names a manifest entry should match under: the framework's own name, or
/// its registered alternate package identifier.
fn matches_name(entry_def: &FrameworkEntry, candidate: &str) -> bool {
    candidate == entry_def.name || Some(candidate) == entry_def.package_pattern
}

/// Descends dotted key paths (TOML for Cargo/pyproject, JSON for
/// `package.json`) looking for a dependency table entry matching this
/// framework, resolving `version = "workspace"` against the nearest
/// ancestor workspace manifest.
fn detect_via_key_paths(
    path: &Path,
    entry_def: &FrameworkEntry,
    paths: &[&[&str]],
    workspace_cache: &mut HashMap<PathBuf, Option<toml::Value>>,
) -> Option<Option<String>> {
    let content = fs::read_to_string(path).ok()?;
    let is_json = path.extension().is_some_and(|e| e == "json");

    if is_json {
        let value: serde_json::Value = serde_json::from_str(&content).ok()?;
        for dotted in paths {
            if let Some(found) = descend_json(&value, dotted, entry_def) {
                return Some(found);
            }
        }
        None
    } else {
        let value: toml::Value = toml::from_str(&content).ok()?;
        for dotted in paths {
            if let Some(found) = descend_toml(&value, dotted, entry_def, path, workspace_cache) {
                return Some(found);
            }
        }
        None
    }
}

fn descend_json(
    value: &serde_json::Value,
    dotted: &[&str],
    entry_def: &FrameworkEntry,
) -> Option<Option<String>> {
    let mut current = vec![value];
    for segment in dotted {
        let mut next = Vec::new();
        for node in current {
            if *segment == "*" {
                if let Some(map) = node.as_object() {
                    next.extend(map.values());
                }
            } else if let Some(child) = node.get(segment) {
                next.push(child);
            }
        }
        current = next;
    }
    for node in current {
        if let Some(map) = node.as_object() {
            for (key, val) in map {
                if matches_name(entry_def, key) {
                    let version = val.as_str().map(|s| strip_semver_operators(s));
                    return Some(version);
                }
            }
        }
    }
    None
}

fn descend_toml(
    value: &toml::Value,
    dotted: &[&str],
    entry_def: &FrameworkEntry,
    manifest_path: &Path,
    workspace_cache: &mut HashMap<PathBuf, Option<toml::Value>>,
) -> Option<Option<String>> {
    let mut current = vec![value];
    for segment in dotted {
        let mut next = Vec::new();
        for node in current {
            if *segment == "*" {
                if let Some(table) = node.as_table() {
                    next.extend(table.values());
                }
            } else if let Some(child) = node.get(segment) {
                next.push(child);
            }
        }
        current = next;
    }
    for node in current {
        if let Some(table) = node.as_table() {
            for (key, val) in table {
                if !matches_name(entry_def, key) {
                    continue;
                }
                let raw_version = match val {
                    toml::Value::String(s) => Some(s.clone()),
                    toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()).map(str::to_owned),
                    _ => None,
                };
                let version = match raw_version {
                    Some(v) if v == "workspace" || is_workspace_table(val) => {
                        resolve_workspace_version(manifest_path, key, workspace_cache)
                    }
                    Some(v) => Some(strip_semver_operators(&v)),
                    None => None,
                };
                return Some(version);
            }
        }
    }
    None
}

fn is_workspace_table(value: &toml::Value) -> bool {
    value
        .as_table()
        .and_then(|t| t.get("workspace"))
        .and_then(toml::Value::as_bool)
        .unwrap_or(false)
}

/// Walks upward from `manifest_path` looking for the workspace root
/// `Cargo.toml`, then reads `[workspace.dependencies].<name>` from it.
/// Results (including misses) are memoized per discovered workspace root.
fn resolve_workspace_version(
    manifest_path: &Path,
    dep_name: &str,
    cache: &mut HashMap<PathBuf, Option<toml::Value>>,
) -> Option<String> {
    let mut dir = manifest_path.parent()?;
    loop {
        let candidate = dir.join("Cargo.toml");
        if candidate != manifest_path && candidate.exists() {
            let parsed = cache.entry(candidate.clone()).or_insert_with(|| {
                fs::read_to_string(&candidate)
                    .ok()
                    .and_then(|s| toml::from_str::<toml::Value>(&s).ok())
            });
            if let Some(root_doc) = parsed {
                if let Some(version) = root_doc
                    .get("workspace")
                    .and_then(|w| w.get("dependencies"))
                    .and_then(|d| d.get(dep_name))
                    .and_then(|dep| match dep {
                        toml::Value::String(s) => Some(s.clone()),
                        toml::Value::Table(t) => {
                            t.get("version").and_then(|v| v.as_str()).map(str::to_owned)
                        }
                        _ => None,
                    })
                {
                    return Some(strip_semver_operators(&version));
                }
            }
        }
        dir = dir.parent()?;
    }
}

/// Removes semver range operators (`^`, `~`, `>=`, ...) from the front of a
/// version string, leaving a bare numeric version where possible.
fn strip_semver_operators(raw: &str) -> String {
    raw.trim_start_matches(['^', '~', '=', '>', '<', ' '])
        .to_owned()
}

/// Substring match against raw file content, with a best-effort regex pull
/// of a nearby `version = "..."` value.
fn detect_via_content_search(path: &Path, entry_def: &FrameworkEntry) -> Option<Option<String>> {
    let content = fs::read_to_string(path).ok()?;
    let haystack = content.to_lowercase();
    let needle = entry_def.package_pattern.unwrap_or(entry_def.name).to_lowercase();
    if !haystack.contains(&needle) {
        return None;
    }
    let version = version_regex()
        .captures(&content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned());
    Some(version)
}

fn version_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r#"version\s*[:=]\s*['"]([0-9][0-9A-Za-z.\-]*)['"]"#).expect("valid regex"))
}

/// Per-line text match for `requirements.txt`-style manifests: strips
/// comments and inline markers, then compares the package name against
/// standard PEP 508 version separators.
fn detect_via_line_search(path: &Path, entry_def: &FrameworkEntry) -> Option<Option<String>> {
    let content = fs::read_to_string(path).ok()?;
    let needle = entry_def.package_pattern.unwrap_or(entry_def.name).to_lowercase();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let name_part = line
            .split(|c| "=<>!~[;".contains(c))
            .next()
            .unwrap_or(line)
            .trim()
            .to_lowercase();
        if name_part != needle {
            continue;
        }
        if let Some(idx) = line.find("==") {
            let version = line[idx + 2..]
                .trim()
                .split(|c: char| c.is_whitespace() || c == ';')
                .next()
                .unwrap_or("")
                .to_owned();
            return Some(if version.is_empty() { None } else { Some(version) });
        }
        return Some(None);
    }
    None
}

/// Source extensions worth scanning for the import-pattern fallback.
const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "jsx", "ts", "tsx", "rs", "go"];

/// Second pass: for any registry entry not already recorded in a directory,
/// check whether its `import_patterns` appear in that directory's source
/// files. Manifest-derived records are never touched by this pass.
fn scan_imports(root: &Path, records: &mut HashMap<(&'static str, PathBuf), FrameworkRecord>) {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !EXCLUDED_DIRS.contains(&name))
        })
        .build();

    for entry in walker.filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let is_source = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        if !is_source {
            continue;
        }
        let Some(dir) = path.parent() else { continue };
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };

        for entry_def in FRAMEWORK_REGISTRY {
            if entry_def.import_patterns.is_empty() {
                continue;
            }
            let key = (entry_def.name, dir.to_path_buf());
            if records.contains_key(&key) {
                continue;
            }
            if entry_def
                .import_patterns
                .iter()
                .any(|pat| content.contains(pat))
            {
                records.insert(
                    key,
                    FrameworkRecord {
                        framework: entry_def.name,
                        language: entry_def.language,
                        directory: dir.to_path_buf(),
                        version: None,
                        source: DetectionOrigin::Imports,
                        category: entry_def.category,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).expect("create test file");
        f.write_all(content.as_bytes()).expect("write test file");
        path
    }

    #[test]
    fn detects_flask_from_requirements_txt() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(tmp.path(), "requirements.txt", "flask==2.3.1\nrequests\n");
        let records = detect_frameworks(tmp.path());
        let flask = records.iter().find(|r| r.framework == "flask").expect("flask detected");
        assert_eq!(flask.version.as_deref(), Some("2.3.1"));
    }

    #[test]
    fn detects_react_from_package_json() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(
            tmp.path(),
            "package.json",
            r#"{"dependencies": {"react": "^18.2.0"}}"#,
        );
        let records = detect_frameworks(tmp.path());
        let react = records.iter().find(|r| r.framework == "react").expect("react detected");
        assert_eq!(react.version.as_deref(), Some("18.2.0"));
    }

    #[test]
    fn falls_back_to_imports_when_no_manifest() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(tmp.path(), "app.py", "from flask import Flask\napp = Flask(__name__)\n");
        let records = detect_frameworks(tmp.path());
        let flask = records.iter().find(|r| r.framework == "flask").expect("flask detected via import");
        assert_eq!(flask.source, DetectionOrigin::Imports);
        assert!(flask.version.is_none());
    }

    #[test]
    fn manifest_detection_supersedes_import_only() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(tmp.path(), "requirements.txt", "flask==2.3.1\n");
        write_file(tmp.path(), "app.py", "from flask import Flask\n");
        let records = detect_frameworks(tmp.path());
        let flask = records.iter().find(|r| r.framework == "flask").expect("flask detected");
        assert_eq!(flask.source, DetectionOrigin::Manifest("requirements.txt"));
        assert_eq!(flask.version.as_deref(), Some("2.3.1"));
    }

    #[test]
    fn docker_compose_exists_detection_has_no_version() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_file(tmp.path(), "docker-compose.yml", "services: {}\n");
        let records = detect_frameworks(tmp.path());
        let compose = records
            .iter()
            .find(|r| r.framework == "docker-compose")
            .expect("docker-compose detected");
        assert!(compose.version.is_none());
    }
}
