//! Go ecosystem: `go.mod` `require` directives (both single-line and block
//! form).

use super::{DepsError, Dependency, DocFetchStatus, PackageManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct GoManager;

const FILE_PATTERNS: &[&str] = &["go.mod"];

#[async_trait]
impl PackageManager for GoManager {
    fn manager_name(&self) -> &'static str {
        "go"
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        FILE_PATTERNS
    }

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError> {
        let content = fs::read_to_string(path)
            .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
        let mut deps = Vec::new();
        let mut in_require_block = false;
        for line in content.lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("require (") {
                in_require_block = true;
                continue;
            }
            if in_require_block && line == ")" {
                in_require_block = false;
                continue;
            }
            let body = if in_require_block {
                Some(line)
            } else {
                line.strip_prefix("require ")
            };
            let Some(body) = body else { continue };
            let mut parts = body.split_whitespace();
            let (Some(name), Some(version)) = (parts.next(), parts.next()) else { continue };
            deps.push(Dependency {
                name: name.to_owned(),
                version: version.trim_start_matches('v').to_owned(),
                manager: "go",
                source_file: path.to_path_buf(),
                dev_only: false,
            });
        }
        Ok(deps)
    }

    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String> {
        let url = format!("https://proxy.golang.org/{}/@latest", dep.name.to_lowercase());
        let response = client.get(url).send().await.ok()?;
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("Version")
            .and_then(|v| v.as_str())
            .map(|v| v.trim_start_matches('v').to_owned())
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
        let names_for_file: HashMap<&str, &str> = deps
            .iter()
            .filter(|d| d.source_file == path)
            .filter_map(|d| latest.get(&d.name).map(|v| (d.name.as_str(), v.as_str())))
            .collect();

        let rewritten: Vec<String> = content
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                for (name, version) in &names_for_file {
                    if trimmed.starts_with(name) {
                        let indent = &line[..line.len() - trimmed.len()];
                        count += 1;
                        return format!("{indent}{name} v{version}");
                    }
                }
                line.to_owned()
            })
            .collect();
        fs::write(path, rewritten.join("\n") + "\n")
            .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line_require() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("go.mod");
        fs::write(&path, "module example.com/app\n\nrequire github.com/gin-gonic/gin v1.9.1\n")
            .expect("write");
        let deps = GoManager.parse_manifest(&path).expect("parse");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "github.com/gin-gonic/gin");
        assert_eq!(deps[0].version, "1.9.1");
    }

    #[test]
    fn parses_require_block() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("go.mod");
        fs::write(
            &path,
            "module example.com/app\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgithub.com/stretchr/testify v1.8.4 // indirect\n)\n",
        )
        .expect("write");
        let deps = GoManager.parse_manifest(&path).expect("parse");
        assert_eq!(deps.len(), 2);
        let testify = deps.iter().find(|d| d.name.contains("testify")).expect("testify present");
        assert_eq!(testify.version, "1.8.4");
    }
}
