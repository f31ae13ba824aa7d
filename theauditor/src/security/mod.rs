//! Input sanitization and validation shared by every component that turns
//! a string from config, CLI arguments, or a scanned manifest into a
//! filesystem path, shell argument, or URL fragment.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("path traversal attempt detected: {0} resolves outside project root")]
    PathTraversal(String),
    #[error("failed to resolve path {path}: {source}")]
    Resolve { path: String, source: std::io::Error },
    #[error("empty path in config[{section}][{key}]")]
    EmptyConfigPath { section: String, key: String },
}

/// Resolves `path_str` against `project_root` (defaulting to `.`) and
/// rejects it if the resolved path escapes the root, even via `..` or a
/// symlink. Mirrors the behavior of `Path::resolve` against a project
/// root: the path need not exist yet, only its existing ancestor does.
pub fn sanitize_path(path_str: &str, project_root: Option<&Path>) -> Result<PathBuf, SecurityError> {
    let root = project_root.unwrap_or_else(|| Path::new("."));
    let root = canonicalize_best_effort(root)?;

    let candidate = Path::new(path_str);
    let target = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    let target = canonicalize_best_effort(&target)?;

    if target.starts_with(&root) {
        Ok(target)
    } else {
        Err(SecurityError::PathTraversal(path_str.to_owned()))
    }
}

/// Canonicalizes as much of `path` as already exists on disk, then
/// reattaches the non-existent tail (lexically normalized, no `..`
/// components allowed to survive). Lets `sanitize_path` validate paths
/// that don't exist yet, such as a report destination about to be created.
fn canonicalize_best_effort(path: &Path) -> Result<PathBuf, SecurityError> {
    let mut existing = path;
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
    while !existing.exists() {
        match existing.parent() {
            Some(parent) => {
                if let Some(name) = existing.file_name() {
                    tail.push(name);
                }
                existing = parent;
            }
            None => break,
        }
    }

    let mut resolved = existing.canonicalize().map_err(|source| SecurityError::Resolve {
        path: path.display().to_string(),
        source,
    })?;

    for segment in tail.into_iter().rev() {
        if segment == ".." {
            return Err(SecurityError::PathTraversal(path.display().to_string()));
        }
        resolved.push(segment);
    }
    Ok(resolved)
}

/// Quotes `arg` for safe inclusion in a POSIX shell command line, following
/// the same single-quote-everything strategy as Python's `shlex.quote`: no
/// quoting needed for a string of only safe characters, otherwise wrap in
/// single quotes and escape embedded single quotes as `'\''`.
#[must_use]
pub fn sanitize_shell_arg(arg: &str) -> String {
    if !arg.is_empty() && arg.bytes().all(is_shell_safe_byte) {
        return arg.to_owned();
    }
    let escaped = arg.replace('\'', r"'\''");
    format!("'{escaped}'")
}

fn is_shell_safe_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'/' | b'@' | b'%' | b'+' | b'=' | b':')
}

/// Percent-encodes `component` for safe inclusion as a single URL path or
/// query component (equivalent to Python's `urllib.parse.quote(..., safe="")`).
#[must_use]
pub fn sanitize_url_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn npm_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^(@[a-z0-9][\w.-]*/)?[a-z0-9][\w.-]*$").expect("valid regex"))
}

fn py_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][\w.-]*$").expect("valid regex"))
}

fn docker_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][\w./:-]*$").expect("valid regex"))
}

/// Package manager a [`validate_package_name`] pattern is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerKind {
    Npm,
    Python,
    Docker,
}

/// True if `name` is a syntactically valid package identifier for
/// `manager`. Used before a name is interpolated into a registry URL or
/// passed to a subprocess, so a manifest with a crafted package name can't
/// smuggle shell metacharacters or path components through.
#[must_use]
pub fn validate_package_name(name: &str, manager: PackageManagerKind) -> bool {
    if name.is_empty() || name.len() > 214 {
        return false;
    }
    match manager {
        PackageManagerKind::Npm => npm_name_re().is_match(name),
        PackageManagerKind::Python => py_name_re().is_match(name),
        PackageManagerKind::Docker => docker_name_re().is_match(name),
    }
}

/// Sanitizes a path value read out of `.theauditor.toml`. Paths configured
/// under the `paths` section for `manifest`/`db`/`workset`/`pf_dir` are
/// pinned under `.pf/` regardless of what the config says, so a malicious
/// or mistaken config can't redirect the indexed store outside the
/// project's own working directory.
pub fn sanitize_config_path(
    config_value: &str,
    config_section: &str,
    config_key: &str,
    project_root: &Path,
) -> Result<PathBuf, SecurityError> {
    if config_value.is_empty() {
        return Err(SecurityError::EmptyConfigPath {
            section: config_section.to_owned(),
            key: config_key.to_owned(),
        });
    }

    let pinned_keys = ["manifest", "db", "workset", "pf_dir"];
    let value = if config_section == "paths"
        && pinned_keys.contains(&config_key)
        && !config_value.starts_with("./.pf/")
        && !config_value.starts_with(".pf/")
    {
        let name = Path::new(config_value)
            .file_name()
            .map_or_else(|| config_value.to_owned(), |n| n.to_string_lossy().into_owned());
        format!("./.pf/{name}")
    } else {
        config_value.to_owned()
    };

    sanitize_path(&value, Some(project_root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_path_rejects_traversal_outside_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = sanitize_path("../../etc/passwd", Some(dir.path())).unwrap_err();
        assert!(matches!(err, SecurityError::PathTraversal(_)));
    }

    #[test]
    fn sanitize_path_accepts_relative_path_inside_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("src")).expect("mkdir");
        let resolved = sanitize_path("src/main.py", Some(dir.path())).expect("resolves");
        assert!(resolved.starts_with(dir.path().canonicalize().expect("canon")));
    }

    #[test]
    fn sanitize_shell_arg_leaves_safe_strings_untouched() {
        assert_eq!(sanitize_shell_arg("hello-world.txt"), "hello-world.txt");
    }

    #[test]
    fn sanitize_shell_arg_quotes_and_escapes_unsafe_strings() {
        assert_eq!(sanitize_shell_arg("a b"), "'a b'");
        assert_eq!(sanitize_shell_arg("it's"), r"'it'\''s'");
    }

    #[test]
    fn sanitize_url_component_escapes_reserved_characters() {
        assert_eq!(sanitize_url_component("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn validate_package_name_rules_per_manager() {
        assert!(validate_package_name("@scope/name", PackageManagerKind::Npm));
        assert!(!validate_package_name("@Scope/Name", PackageManagerKind::Npm));
        assert!(validate_package_name("Django", PackageManagerKind::Python));
        assert!(validate_package_name("nginx:latest", PackageManagerKind::Docker));
        assert!(!validate_package_name("", PackageManagerKind::Python));
    }

    #[test]
    fn sanitize_config_path_pins_store_paths_under_pf_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join(".pf")).expect("mkdir");
        let resolved =
            sanitize_config_path("custom/manifest.json", "paths", "manifest", dir.path())
                .expect("resolves");
        assert!(resolved.ends_with("manifest.json"));
        assert!(resolved.to_string_lossy().contains(".pf"));
    }

    #[test]
    fn sanitize_config_path_rejects_empty_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = sanitize_config_path("", "paths", "db", dir.path()).unwrap_err();
        assert!(matches!(err, SecurityError::EmptyConfigPath { .. }));
    }
}
