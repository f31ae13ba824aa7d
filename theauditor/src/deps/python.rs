//! Python ecosystem: `pyproject.toml` (PEP 621, Poetry, PDM, Hatch layouts),
//! `requirements*.txt` (including nested monorepo copies), and `setup.cfg`.

use super::{strip_semver_operators, DepsError, Dependency, DocFetchStatus, PackageManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct PythonManager;

const FILE_PATTERNS: &[&str] = &["pyproject.toml", "requirements*.txt", "setup.cfg"];

#[async_trait]
impl PackageManager for PythonManager {
    fn manager_name(&self) -> &'static str {
        "python"
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        FILE_PATTERNS
    }

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if file_name == "pyproject.toml" {
            parse_pyproject(path)
        } else if file_name == "setup.cfg" {
            parse_setup_cfg(path)
        } else {
            parse_requirements(path)
        }
    }

    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String> {
        let url = format!("https://pypi.org/pypi/{}/json", dep.name);
        let response = client.get(url).send().await.ok()?;
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("info")?.get("version")?.as_str().map(str::to_owned)
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
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let (rewritten, count) = if file_name == "pyproject.toml" {
            rewrite_pyproject(&content, latest, deps, path)
        } else {
            rewrite_requirements(&content, latest, deps, path)
        };

        fs::write(path, rewritten).map_err(|source| DepsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(count)
    }
}

fn parse_requirements(path: &Path) -> Result<Vec<Dependency>, DepsError> {
    let content = fs::read_to_string(path)
        .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
    let mut deps = Vec::new();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('-') {
            continue;
        }
        let name_part = line
            .split(|c| "=<>!~[;".contains(c))
            .next()
            .unwrap_or(line)
            .trim();
        if name_part.is_empty() {
            continue;
        }
        let version = line
            .find("==")
            .map(|idx| {
                line[idx + 2..]
                    .trim()
                    .split(|c: char| c.is_whitespace() || c == ';')
                    .next()
                    .unwrap_or("")
                    .to_owned()
            })
            .unwrap_or_default();
        deps.push(Dependency {
            name: name_part.to_owned(),
            version,
            manager: "python",
            source_file: path.to_path_buf(),
            dev_only: path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains("dev") || n.contains("test")),
        });
    }
    Ok(deps)
}

fn parse_pyproject(path: &Path) -> Result<Vec<Dependency>, DepsError> {
    let content = fs::read_to_string(path)
        .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
    let value: toml::Value = toml::from_str(&content)
        .map_err(|e| DepsError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;

    let mut deps = Vec::new();

    // PEP 621: [project] dependencies = ["flask>=2.0", ...]
    if let Some(list) = value.get("project").and_then(|p| p.get("dependencies")).and_then(|d| d.as_array()) {
        for item in list {
            if let Some(spec) = item.as_str() {
                if let Some(dep) = parse_pep508(spec, path, false) {
                    deps.push(dep);
                }
            }
        }
    }
    if let Some(groups) = value
        .get("project")
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(|d| d.as_table())
    {
        for group in groups.values() {
            if let Some(list) = group.as_array() {
                for item in list {
                    if let Some(spec) = item.as_str() {
                        if let Some(dep) = parse_pep508(spec, path, true) {
                            deps.push(dep);
                        }
                    }
                }
            }
        }
    }

    // Poetry / PDM: [tool.poetry.dependencies] name = "version" | { version = "..." }
    for tool_key in ["poetry", "pdm"] {
        if let Some(table) = value
            .get("tool")
            .and_then(|t| t.get(tool_key))
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            for (name, spec) in table {
                if name == "python" {
                    continue;
                }
                let version = match spec {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Table(t) => {
                        t.get("version").and_then(|v| v.as_str()).unwrap_or("").to_owned()
                    }
                    _ => String::new(),
                };
                deps.push(Dependency {
                    name: name.clone(),
                    version: strip_semver_operators(&version),
                    manager: "python",
                    source_file: path.to_path_buf(),
                    dev_only: false,
                });
            }
        }
    }

    Ok(deps)
}

/// Parses a bare PEP 508 requirement string (`"flask>=2.0"`, `"requests"`).
fn parse_pep508(spec: &str, path: &Path, dev_only: bool) -> Option<Dependency> {
    let spec = spec.split(';').next().unwrap_or(spec).trim();
    let name = spec
        .split(|c: char| "=<>!~[ ".contains(c))
        .next()
        .unwrap_or(spec)
        .trim();
    if name.is_empty() {
        return None;
    }
    let version = spec
        .find("==")
        .map(|idx| spec[idx + 2..].trim().to_owned())
        .unwrap_or_default();
    Some(Dependency {
        name: name.to_owned(),
        version,
        manager: "python",
        source_file: path.to_path_buf(),
        dev_only,
    })
}

/// `setup.cfg` uses an INI layout; only the `[options] install_requires`
/// list (one requirement per line) is extracted.
fn parse_setup_cfg(path: &Path) -> Result<Vec<Dependency>, DepsError> {
    let content = fs::read_to_string(path)
        .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
    let mut deps = Vec::new();
    let mut in_install_requires = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_install_requires = false;
            continue;
        }
        if trimmed.starts_with("install_requires") {
            in_install_requires = true;
            continue;
        }
        if in_install_requires {
            if line.starts_with(char::is_whitespace) && !trimmed.is_empty() {
                if let Some(dep) = parse_pep508(trimmed, path, false) {
                    deps.push(dep);
                }
            } else if !trimmed.is_empty() {
                in_install_requires = false;
            }
        }
    }
    Ok(deps)
}

fn rewrite_requirements(
    content: &str,
    latest: &HashMap<String, String>,
    deps: &[Dependency],
    path: &Path,
) -> (String, usize) {
    let mut count = 0;
    let names_for_file: std::collections::HashSet<&str> = deps
        .iter()
        .filter(|d| d.source_file == path)
        .map(|d| d.name.as_str())
        .collect();

    let rewritten: Vec<String> = content
        .lines()
        .map(|line| {
            let name_part = line
                .split(|c| "=<>!~[;#".contains(c))
                .next()
                .unwrap_or(line)
                .trim();
            if names_for_file.contains(name_part) {
                if let Some(new_version) = latest.get(name_part) {
                    count += 1;
                    return format!("{name_part}=={new_version}");
                }
            }
            line.to_owned()
        })
        .collect();
    (rewritten.join("\n") + "\n", count)
}

fn rewrite_pyproject(
    content: &str,
    latest: &HashMap<String, String>,
    deps: &[Dependency],
    path: &Path,
) -> (String, usize) {
    // Regex replacement scoped to quoted version specifiers, preserving the
    // rest of the file's formatting untouched.
    let mut count = 0;
    let mut rewritten = content.to_owned();
    for dep in deps.iter().filter(|d| d.source_file == path) {
        let Some(new_version) = latest.get(&dep.name) else { continue };
        let pattern = format!(
            r#"(?m)^(\s*"?{}"?\s*=\s*")[^"]*(")"#,
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
    (rewritten, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_requirements_txt_pins() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("requirements.txt");
        fs::write(&path, "flask==2.3.1\n# a comment\nrequests>=2.0\n").expect("write");
        let deps = PythonManager.parse_manifest(&path).expect("parse");
        let flask = deps.iter().find(|d| d.name == "flask").expect("flask present");
        assert_eq!(flask.version, "2.3.1");
        let requests = deps.iter().find(|d| d.name == "requests").expect("requests present");
        assert_eq!(requests.version, "");
    }

    #[test]
    fn parses_pep621_dependencies() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("pyproject.toml");
        fs::write(&path, "[project]\ndependencies = [\"flask>=2.0\", \"requests==2.31.0\"]\n")
            .expect("write");
        let deps = PythonManager.parse_manifest(&path).expect("parse");
        assert_eq!(deps.len(), 2);
        let requests = deps.iter().find(|d| d.name == "requests").expect("requests present");
        assert_eq!(requests.version, "2.31.0");
    }

    #[test]
    fn parses_poetry_dependencies_table() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("pyproject.toml");
        fs::write(
            &path,
            "[tool.poetry.dependencies]\npython = \"^3.11\"\nflask = \"^2.3.1\"\n",
        )
        .expect("write");
        let deps = PythonManager.parse_manifest(&path).expect("parse");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "flask");
        assert_eq!(deps[0].version, "2.3.1");
    }
}
