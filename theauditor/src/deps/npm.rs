//! npm ecosystem: `package.json` dependency extraction and registry lookups.
//! Workspace glob expansion (Yarn/npm workspaces, Lerna, pnpm) is handled by
//! the shared manifest walk in [`super::discover_manifests`], which already
//! finds every `package.json` under the repository regardless of nesting.

use super::{strip_semver_operators, DepsError, Dependency, DocFetchStatus, PackageManager};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct NpmManager;

const FILE_PATTERNS: &[&str] = &["package.json"];

#[async_trait]
impl PackageManager for NpmManager {
    fn manager_name(&self) -> &'static str {
        "npm"
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        FILE_PATTERNS
    }

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError> {
        let content = fs::read_to_string(path).map_err(|source| DepsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| DepsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut deps = Vec::new();
        extend_from_section(&value, "dependencies", path, false, &mut deps);
        extend_from_section(&value, "devDependencies", path, true, &mut deps);
        extend_from_section(&value, "peerDependencies", path, true, &mut deps);
        Ok(deps)
    }

    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String> {
        let url = format!("https://registry.npmjs.org/{}/latest", dep.name);
        let response = client.get(url).send().await.ok()?;
        let body: Value = response.json().await.ok()?;
        body.get("version").and_then(Value::as_str).map(str::to_owned)
    }

    async fn fetch_docs(
        &self,
        _client: &reqwest::Client,
        dep: &Dependency,
        _out_dir: &Path,
        allowlist: &[String],
    ) -> DocFetchStatus {
        if !allowlist.is_empty() && !allowlist.iter().any(|a| a == &dep.name) {
            return DocFetchStatus::NotAllowlisted;
        }
        DocFetchStatus::NotFound
    }

    fn upgrade_file(
        &self,
        path: &Path,
        latest: &HashMap<String, String>,
        deps: &[Dependency],
    ) -> Result<usize, DepsError> {
        let content = fs::read_to_string(path).map_err(|source| DepsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut value: Value = serde_json::from_str(&content).map_err(|e| DepsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut count = 0;
        for section in ["dependencies", "devDependencies", "peerDependencies"] {
            let Some(table) = value.get_mut(section).and_then(Value::as_object_mut) else {
                continue;
            };
            for dep in deps.iter().filter(|d| d.source_file == path) {
                if let Some(new_version) = latest.get(&dep.name) {
                    if table.contains_key(&dep.name) {
                        table.insert(dep.name.clone(), Value::String(format!("^{new_version}")));
                        count += 1;
                    }
                }
            }
        }
        let rendered = serde_json::to_string_pretty(&value).map_err(|e| DepsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, rendered + "\n").map_err(|source| DepsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(count)
    }
}

fn extend_from_section(
    value: &Value,
    section: &str,
    path: &Path,
    dev_only: bool,
    out: &mut Vec<Dependency>,
) {
    let Some(table) = value.get(section).and_then(Value::as_object) else {
        return;
    };
    for (name, version) in table {
        let Some(version) = version.as_str() else { continue };
        out.push(Dependency {
            name: name.clone(),
            version: strip_semver_operators(version),
            manager: "npm",
            source_file: path.to_path_buf(),
            dev_only,
        });
    }
}
