//! Docker ecosystem: `docker-compose*.yml` service images and `Dockerfile`
//! `FROM` instructions. Version strings here are image tags, not semver —
//! comparison and upgrade suggestions go through [`super::docker_tag`].

use super::{DepsError, Dependency, DocFetchStatus, PackageManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct DockerManager;

const FILE_PATTERNS: &[&str] = &["docker-compose*.yml", "docker-compose*.yaml", "Dockerfile*"];

#[async_trait]
impl PackageManager for DockerManager {
    fn manager_name(&self) -> &'static str {
        "docker"
    }

    fn file_patterns(&self) -> &'static [&'static str] {
        FILE_PATTERNS
    }

    fn parse_manifest(&self, path: &Path) -> Result<Vec<Dependency>, DepsError> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if file_name.starts_with("Dockerfile") {
            parse_dockerfile(path)
        } else {
            parse_compose(path)
        }
    }

    async fn fetch_latest(&self, client: &reqwest::Client, dep: &Dependency) -> Option<String> {
        // Docker Hub's tag list endpoint for the `library` namespace; images
        // under an org namespace would use `repositories/{org}/{name}`.
        let (namespace, repo) = dep.name.split_once('/').unwrap_or(("library", &dep.name));
        let url =
            format!("https://registry.hub.docker.com/v2/repositories/{namespace}/{repo}/tags?page_size=25");
        let response = client.get(url).send().await.ok()?;
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("results")?
            .as_array()?
            .iter()
            .find_map(|entry| entry.get("name")?.as_str().map(str::to_owned))
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
                for (name, version) in &names_for_file {
                    if let Some(idx) = line.find(&format!("{name}:")) {
                        let prefix = &line[..idx + name.len() + 1];
                        count += 1;
                        return format!("{prefix}{version}");
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

fn parse_compose(path: &Path) -> Result<Vec<Dependency>, DepsError> {
    let content = fs::read_to_string(path)
        .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content)
        .map_err(|e| DepsError::Parse { path: path.to_path_buf(), reason: e.to_string() })?;

    let mut deps = Vec::new();
    if let Some(services) = value.get("services").and_then(serde_yaml::Value::as_mapping) {
        for service in services.values() {
            let Some(image) = service.get("image").and_then(serde_yaml::Value::as_str) else {
                continue;
            };
            if let Some((name, tag)) = split_image_ref(image) {
                deps.push(Dependency {
                    name,
                    version: tag,
                    manager: "docker",
                    source_file: path.to_path_buf(),
                    dev_only: false,
                });
            }
        }
    }
    Ok(deps)
}

fn parse_dockerfile(path: &Path) -> Result<Vec<Dependency>, DepsError> {
    let content = fs::read_to_string(path)
        .map_err(|source| DepsError::Read { path: path.to_path_buf(), source })?;
    let mut deps = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("FROM ") else { continue };
        // Strip a multi-stage `AS alias` suffix before parsing the image ref.
        let image = rest.split_whitespace().next().unwrap_or(rest);
        if let Some((name, tag)) = split_image_ref(image) {
            deps.push(Dependency {
                name,
                version: tag,
                manager: "docker",
                source_file: path.to_path_buf(),
                dev_only: false,
            });
        }
    }
    Ok(deps)
}

/// Splits `registry.example.com/org/image:tag` into `(name, tag)`, dropping
/// any registry host prefix (detected by a `.` or `:` before the first `/`).
fn split_image_ref(image: &str) -> Option<(String, String)> {
    let (name_part, tag) = image.rsplit_once(':').unwrap_or((image, "latest"));
    if tag.contains('/') {
        // The ':' we split on was a registry port, not a tag separator.
        return Some((image.to_owned(), "latest".to_owned()));
    }
    Some((name_part.to_owned(), tag.to_owned()))
}
