//! Correlation rules: user-defined co-occurrence predicates matched
//! against a file's findings. A file matches a rule iff every one of the
//! rule's facts is satisfied by at least one finding on that file.

use crate::store::StoredFinding;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read correlation rules file {path}: {source}")]
    Read { path: std::path::PathBuf, source: std::io::Error },
    #[error("failed to parse correlation rules file {path}: {source}")]
    Parse { path: std::path::PathBuf, source: serde_yaml::Error },
}

/// The finding attribute a predicate is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Tool,
    Rule,
    Category,
    Severity,
    Message,
    Cwe,
}

impl Field {
    fn value<'a>(self, finding: &'a StoredFinding) -> &'a str {
        match self {
            Self::Tool => &finding.tool,
            Self::Rule => &finding.rule,
            Self::Category => finding.category.as_deref().unwrap_or(""),
            Self::Severity => &finding.severity,
            Self::Message => &finding.message,
            Self::Cwe => finding.cwe.as_deref().unwrap_or(""),
        }
    }
}

/// The minimal starter predicate grammar: `{field: regex|equals|contains}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredicateKind {
    Equals { value: String },
    Contains { value: String },
    Regex { pattern: String },
}

/// One co-occurring fact a rule requires: some finding on the file must
/// satisfy `field` against `predicate`.
#[derive(Debug, Clone, Deserialize)]
pub struct FactPredicate {
    pub field: Field,
    pub predicate: PredicateKind,
}

impl FactPredicate {
    fn matches(&self, finding: &StoredFinding) -> bool {
        let value = self.field.value(finding);
        match &self.predicate {
            PredicateKind::Equals { value: expected } => value == expected,
            PredicateKind::Contains { value: needle } => value.contains(needle.as_str()),
            PredicateKind::Regex { pattern } => {
                Regex::new(pattern).is_ok_and(|re| re.is_match(value))
            }
        }
    }
}

/// A user-defined co-occurrence rule, loaded from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationRule {
    pub name: String,
    pub description: String,
    pub confidence: f64,
    pub facts: Vec<FactPredicate>,
}

/// Loads a `Vec<CorrelationRule>` from a single YAML file holding a
/// top-level sequence. A missing file yields an empty rule list rather
/// than an error, mirroring `crate::patterns::load_patterns_dir` — a
/// project with no correlation rules configured still runs `fce_correlate`
/// with zero rules rather than failing the phase.
pub fn load_from_file(path: &Path) -> Result<Vec<CorrelationRule>, RulesError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let contents =
        std::fs::read_to_string(path).map_err(|source| RulesError::Read { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&contents).map_err(|source| RulesError::Parse { path: path.to_path_buf(), source })
}

/// One matched rule against one file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CorrelationMatch {
    pub rule_name: String,
    pub file: String,
    pub description: String,
    pub confidence: f64,
}

/// Evaluates every loaded rule against every file's findings, emitting one
/// match per (rule, file) where every one of the rule's facts is satisfied
/// by at least one finding on that file.
#[must_use]
pub fn evaluate_all(findings: &[StoredFinding], rules: &[CorrelationRule]) -> Vec<CorrelationMatch> {
    let by_file = super::group_by_file(findings);
    let mut matches = Vec::new();

    let mut files: Vec<&str> = by_file.keys().copied().collect();
    files.sort_unstable();

    for file in files {
        let file_findings = &by_file[file];
        for rule in rules {
            if rule_matches(rule, file_findings) {
                matches.push(CorrelationMatch {
                    rule_name: rule.name.clone(),
                    file: file.to_owned(),
                    description: rule.description.clone(),
                    confidence: rule.confidence,
                });
            }
        }
    }
    matches
}

fn rule_matches(rule: &CorrelationRule, findings: &[&StoredFinding]) -> bool {
    rule.facts.iter().all(|fact| findings.iter().any(|f| fact.matches(f)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, facts: Vec<FactPredicate>) -> CorrelationRule {
        CorrelationRule { name: name.to_owned(), description: "d".to_owned(), confidence: 0.9, facts }
    }

    #[test]
    fn rule_matches_when_every_fact_has_a_satisfying_finding() {
        let findings = vec![
            StoredFinding::now("a.py", 1, "r1", "bandit", "sql injection", "high"),
            StoredFinding::now("a.py", 5, "r2", "ruff", "unused import", "low"),
        ];
        let rules = vec![rule(
            "sqli-and-lint",
            vec![
                FactPredicate { field: Field::Tool, predicate: PredicateKind::Equals { value: "bandit".to_owned() } },
                FactPredicate {
                    field: Field::Message,
                    predicate: PredicateKind::Contains { value: "unused".to_owned() },
                },
            ],
        )];
        let matches = evaluate_all(&findings, &rules);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_name, "sqli-and-lint");
    }

    #[test]
    fn rule_does_not_match_when_one_fact_is_unsatisfied() {
        let findings = vec![StoredFinding::now("a.py", 1, "r1", "bandit", "sql injection", "high")];
        let rules = vec![rule(
            "needs-two",
            vec![
                FactPredicate { field: Field::Tool, predicate: PredicateKind::Equals { value: "bandit".to_owned() } },
                FactPredicate { field: Field::Tool, predicate: PredicateKind::Equals { value: "ruff".to_owned() } },
            ],
        )];
        assert!(evaluate_all(&findings, &rules).is_empty());
    }

    #[test]
    fn load_from_file_returns_empty_for_missing_path() {
        let rules = load_from_file(Path::new("/nonexistent/correlation_rules.yml")).expect("load");
        assert!(rules.is_empty());
    }

    #[test]
    fn load_from_file_parses_a_yaml_rule_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("correlation_rules.yml");
        std::fs::write(
            &path,
            r"
- name: sqli-and-lint
  description: bandit sqli plus unused import on the same file
  confidence: 0.8
  facts:
    - field: tool
      kind: equals
      value: bandit
",
        )
        .expect("write");

        let rules = load_from_file(&path).expect("load");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "sqli-and-lint");
        assert_eq!(rules[0].facts.len(), 1);
    }

    #[test]
    fn regex_predicate_matches_message_pattern() {
        let findings = vec![StoredFinding::now("a.py", 1, "r1", "bandit", "CVE-2024-1234 detected", "high")];
        let rules = vec![rule(
            "cve-mentioned",
            vec![FactPredicate {
                field: Field::Message,
                predicate: PredicateKind::Regex { pattern: r"CVE-\d{4}-\d+".to_owned() },
            }],
        )];
        assert_eq!(evaluate_all(&findings, &rules).len(), 1);
    }
}
