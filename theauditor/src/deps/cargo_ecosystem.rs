//! Cargo ecosystem: `Cargo.toml` `[dependencies]`/`[dev-dependencies]`
//! tables, including `workspace = true` member delegation back to the
//! nearest ancestor workspace manifest.

use super::{strip_semver_operators, DepsError, Dependency, DocFetchStatus, PackageManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct CargoManager;

const FILE_PATTERNS: &[&str] = &["Cargo.toml"];

#[async_trait]
impl PackageManager for CargoManager {
    fn manager_name(&self) -> &'static str {
        "cargo"
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        FILE_PATTERNS
    }

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError> {
        let content = fs::read_to_string(path)
            .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
        let value: toml::Value = toml::from_str(&content)
            .map_err(|e| DepsError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;

        let mut cache = HashMap::new();
        let mut deps = Vec::new();
        extend_from_table(&value, "dependencies", path, false, &mut cache, &mut deps);
        extend_from_table(&value, "dev-dependencies", path, true, &mut cache, &mut deps);
        extend_from_table(&value, "build-dependencies", path, true, &mut cache, &mut deps);
        Ok(deps)
    }

    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String> {
        let url = format!("https://crates.io/api/v1/crates/{}", dep.name);
        let response = client.get(url).send().await.ok()?;
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("crate")?.get("max_stable_version")?.as_str().map(str::to_owned)
    }

    async fn fetch_docs(
        &self,
        _client: &reqwest::Client,
        _dep: &Dependency,
        _out_dir: &Path,
        _allowlist: &[String],
    ) -> DocFetchStatus {
        DocFetchStatus::NotFound
    }

    fn upgrade_file(
        &self,
        path: &Path,
        latest: &HashMap<String, String>,
        deps: &[Dependency],
    ) -> Result<usize, DepsError> {
        let content = fs::read_to_string(path)
            .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
        let mut count = 0;
        let mut rewritten = content.clone();
        for dep in deps.iter().filter(|d| d.source_file == path) {
            let Some(new_version) = latest.get(&dep.name) else { continue };
            let pattern = format!(
                r#"(?m)^(\s*{}\s*=\s*")[^"]*(")"#,
                regex::escape(&dep.name)
            );
            if let Ok(re) = regex::Regex::new(&pattern) {
                let replaced = re.replace(&rewritten, format!("${{1}}{new_version}${{2}}"));
                if replaced != rewritten {
                    count += 1;
                    rewritten = replaced.into_owned();
                }
            }
        }
        fs::write(path, rewritten)
            .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
        Ok(count)
    }
}

fn extend_from_table(
    value: &toml::Value,
    section: &str,
    path: &Path,
    dev_only: bool,
    workspace_cache: &mut HashMap<std::path::PathBuf, Option<toml::Value>>,
    out: &mut Vec<Dependency>,
) {
    let Some(table) = value.get(section).and_then(toml::Value::as_table) else {
        return;
    };
    for (name, spec) in table {
        let version = match spec {
            toml::Value::String(s) => Some(strip_semver_operators(s)),
            toml::Value::Table(t) => {
                if t.get("path").is_some() && t.get("version").is_none() {
                    None
                } else if t.get("workspace").and_then(toml::Value::as_bool) == Some(true) {
                    resolve_workspace_version(path, name, workspace_cache)
                } else {
                    t.get("version").and_then(|v| v.as_str()).map(strip_semver_operators)
                }
            }
            _ => None,
        };
        let Some(version) = version else { continue };
        out.push(Dependency {
            name: name.clone(),
            version,
            manager: "cargo",
            source_file: path.to_path_buf(),
            dev_only,
        });
    }
}

/// Mirrors `framework::detector::resolve_workspace_version`: walks upward
/// from `manifest_path` looking for the ancestor workspace root, then reads
/// `[workspace.dependencies].<name>` from it, memoized per root.
fn resolve_workspace_version(
    manifest_path: &Path,
    dep_name: &str,
    cache: &mut HashMap<std::path::PathBuf, Option<toml::Value>>,
) -> Option<String> {
    let mut dir = manifest_path.parent()?;
    loop {
        let candidate = dir.join("Cargo.toml");
        if candidate != manifest_path && candidate.exists() {
            let parsed = cache.entry(candidate.clone()).or_insert_with(|| {
                fs::read_to_string(&candidate).ok().and_then(|s| toml::from_str(&s).ok())
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
