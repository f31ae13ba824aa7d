//! Read-only capability inventory: lists every AST rule and every YAML
//! pattern without running any analysis, for the `rules` CLI command.
//! Grounded on `rules::danger::get_danger_rules`/`rules::quality::get_quality_rules`
//! (the AST-walking engine) plus [`super::load_patterns_dir`] (the
//! regex-pattern engine).

use super::load_patterns_dir;
use crate::config::Config;
use crate::rules::{danger, quality};
use std::path::Path;

/// One entry in the capability inventory: a rule or pattern name, which
/// engine it belongs to, and the language it applies to.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleDescriptor {
    pub name: String,
    pub kind: RuleKind,
    pub language: &'static str,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    AstRule,
    Pattern,
}

/// Enumerates every built-in AST rule (`danger`, `quality`) and every YAML
/// pattern found under `patterns_dir`. `patterns_dir` not existing yields
/// an empty pattern contribution rather than an error, matching
/// [`super::load_patterns_dir`]'s own behavior.
#[must_use]
pub fn enumerate(patterns_dir: &Path) -> Vec<RuleDescriptor> {
    let mut out = Vec::new();

    for rule in danger::get_danger_rules() {
        out.push(RuleDescriptor {
            name: rule.code().to_owned(),
            kind: RuleKind::AstRule,
            language: "python",
            category: rule.category().to_owned(),
        });
    }

    for rule in quality::get_quality_rules(&Config::default()) {
        out.push(RuleDescriptor {
            name: rule.code().to_owned(),
            kind: RuleKind::AstRule,
            language: "python",
            category: rule.category().to_owned(),
        });
    }

    if let Ok(patterns) = load_patterns_dir(patterns_dir) {
        for compiled in patterns {
            out.push(RuleDescriptor {
                name: compiled.rule.name.clone(),
                kind: RuleKind::Pattern,
                language: "any",
                category: compiled.rule.category.clone(),
            });
        }
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_includes_builtin_ast_rules_even_without_a_patterns_dir() {
        let descriptors = enumerate(Path::new("/nonexistent/patterns"));
        assert!(!descriptors.is_empty());
        assert!(descriptors.iter().any(|d| d.kind == RuleKind::AstRule));
    }

    #[test]
    fn enumerate_picks_up_yaml_patterns() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("custom.yml"),
            "- name: no-eval\n  severity: high\n  regex: 'eval\\('\n",
        )
        .expect("write");

        let descriptors = enumerate(dir.path());
        assert!(descriptors.iter().any(|d| d.name == "no-eval" && d.kind == RuleKind::Pattern));
    }
}
