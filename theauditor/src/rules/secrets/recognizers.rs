//! Pluggable secret detectors. Each recognizer contributes unscored
//! [`RawFinding`]s; `super::SecretScanner` applies context-based scoring and
//! deduplication afterward.

use super::patterns::get_builtin_patterns;
use crate::config::SecretsConfig;
use crate::utils::LineIndex;
use ruff_python_ast::{Expr, Stmt};
use ruff_text_size::Ranged;
use std::path::PathBuf;

/// An unscored secret detection produced by a single recognizer.
#[derive(Debug, Clone)]
pub struct RawFinding {
    /// Line number (1-indexed).
    pub line: usize,
    /// Human-readable description.
    pub message: String,
    /// Rule identifier (e.g. "TA-S104").
    pub rule_id: String,
    /// Severity string (LOW/MEDIUM/HIGH/CRITICAL).
    pub severity: String,
    /// Redacted matched value, if any.
    pub matched_value: Option<String>,
    /// Shannon entropy of the matched value, if computed.
    pub entropy: Option<f64>,
    /// Pre-scoring confidence, later adjusted by `ContextScorer`.
    pub base_score: u8,
}

/// A pluggable secret detector.
///
/// Implementations receive both the raw text (for regex/entropy scanning)
/// and, when available, the parsed module body (for assignment-target
/// detection). Either method may be a no-op if it doesn't apply.
pub trait SecretRecognizer: Send + Sync {
    /// Scans raw file content.
    fn scan_text(&self, content: &str, file_path: &PathBuf) -> Vec<RawFinding>;

    /// Scans parsed statements. Default: no AST-based detection.
    fn scan_ast(
        &self,
        _stmts: &[Stmt],
        _file_path: &PathBuf,
        _line_index: &LineIndex,
    ) -> Vec<RawFinding> {
        Vec::new()
    }
}

/// Redacts a matched secret value for safe display/storage: keeps the first
/// and last two characters, masks the rest.
fn redact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

// ============================================================================
// Regex recognizer
// ============================================================================

/// Matches the built-in pattern catalog against each line of the file.
pub struct RegexRecognizer;

impl SecretRecognizer for RegexRecognizer {
    fn scan_text(&self, content: &str, _file_path: &PathBuf) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            for pattern in get_builtin_patterns() {
                if let Some(m) = pattern.regex.find(line) {
                    findings.push(RawFinding {
                        line: idx + 1,
                        message: format!("Possible {} detected", pattern.name),
                        rule_id: pattern.rule_id.to_owned(),
                        severity: pattern.severity.to_owned(),
                        matched_value: Some(redact(m.as_str())),
                        entropy: None,
                        base_score: pattern.base_score,
                    });
                }
            }
        }
        findings
    }
}

// ============================================================================
// AST recognizer
// ============================================================================

/// Detects assignments to suspiciously-named variables (`password`,
/// `api_key`, ...) with a string literal value.
pub struct AstRecognizer {
    suspicious_names: Vec<String>,
}

impl AstRecognizer {
    #[must_use]
    pub fn new(suspicious_names: Vec<String>) -> Self {
        Self { suspicious_names }
    }

    fn is_suspicious(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.suspicious_names.iter().any(|s| lower.contains(s.as_str()))
    }

    fn visit_stmts(&self, stmts: &[Stmt], line_index: &LineIndex, out: &mut Vec<RawFinding>) {
        for stmt in stmts {
            self.visit_stmt(stmt, line_index, out);
        }
    }

    fn visit_stmt(&self, stmt: &Stmt, line_index: &LineIndex, out: &mut Vec<RawFinding>) {
        match stmt {
            Stmt::Assign(assign) => {
                if let Expr::StringLiteral(s) = &*assign.value {
                    let value = s.value.to_string();
                    if value.len() < 4 {
                        return;
                    }
                    for target in &assign.targets {
                        if let Expr::Name(n) = target {
                            if self.is_suspicious(n.id.as_str()) {
                                out.push(RawFinding {
                                    line: line_index.line_index(assign.value.range().start()),
                                    message: format!(
                                        "Suspicious assignment to '{}'",
                                        n.id.as_str()
                                    ),
                                    rule_id: "TA-S300".to_owned(),
                                    severity: "HIGH".to_owned(),
                                    matched_value: Some(redact(&value)),
                                    entropy: None,
                                    base_score: 70,
                                });
                            }
                        }
                    }
                }
            }
            Stmt::FunctionDef(node) => self.visit_stmts(&node.body, line_index, out),
            Stmt::ClassDef(node) => self.visit_stmts(&node.body, line_index, out),
            Stmt::If(node) => {
                self.visit_stmts(&node.body, line_index, out);
                for clause in &node.elif_else_clauses {
                    self.visit_stmts(&clause.body, line_index, out);
                }
            }
            Stmt::For(node) => {
                self.visit_stmts(&node.body, line_index, out);
                self.visit_stmts(&node.orelse, line_index, out);
            }
            Stmt::While(node) => {
                self.visit_stmts(&node.body, line_index, out);
                self.visit_stmts(&node.orelse, line_index, out);
            }
            Stmt::With(node) => self.visit_stmts(&node.body, line_index, out),
            Stmt::Try(node) => {
                self.visit_stmts(&node.body, line_index, out);
                for handler in &node.handlers {
                    let ruff_python_ast::ExceptHandler::ExceptHandler(h) = handler;
                    self.visit_stmts(&h.body, line_index, out);
                }
                self.visit_stmts(&node.orelse, line_index, out);
                self.visit_stmts(&node.finalbody, line_index, out);
            }
            _ => {}
        }
    }
}

impl SecretRecognizer for AstRecognizer {
    fn scan_text(&self, _content: &str, _file_path: &PathBuf) -> Vec<RawFinding> {
        Vec::new()
    }

    fn scan_ast(
        &self,
        stmts: &[Stmt],
        _file_path: &PathBuf,
        line_index: &LineIndex,
    ) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        self.visit_stmts(stmts, line_index, &mut findings);
        findings
    }
}

// ============================================================================
// Entropy recognizer
// ============================================================================

/// Flags quoted string literals whose Shannon entropy exceeds a threshold.
pub struct EntropyRecognizer {
    threshold: f64,
    min_length: usize,
}

impl EntropyRecognizer {
    #[must_use]
    pub fn new(threshold: f64, min_length: usize) -> Self {
        Self {
            threshold,
            min_length,
        }
    }
}

/// Matches single- or double-quoted string literals so the entropy
/// recognizer can scan their contents without a full parse.
fn quoted_strings(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let quote = bytes[i];
        if quote == b'\'' || quote == b'"' {
            if let Some(end) = line[i + 1..].find(quote as char) {
                out.push(&line[i + 1..i + 1 + end]);
                i += end + 2;
                continue;
            }
        }
        i += 1;
    }
    out
}

impl SecretRecognizer for EntropyRecognizer {
    fn scan_text(&self, content: &str, _file_path: &PathBuf) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            for candidate in quoted_strings(line) {
                if super::is_high_entropy(candidate, self.threshold, self.min_length) {
                    let entropy = super::calculate_entropy(candidate);
                    findings.push(RawFinding {
                        line: idx + 1,
                        message: "High-entropy string literal".to_owned(),
                        rule_id: "TA-S200".to_owned(),
                        severity: "MEDIUM".to_owned(),
                        matched_value: Some(redact(candidate)),
                        entropy: Some(entropy),
                        base_score: 55,
                    });
                }
            }
        }
        findings
    }
}

// ============================================================================
// Custom recognizer
// ============================================================================

/// Scans against user-supplied regex patterns from configuration.
///
/// Patterns that fail to compile are silently skipped here; they are
/// reported separately by `validate_secrets_config`.
pub struct CustomRecognizer {
    compiled: Vec<(regex::Regex, String, String, u8)>,
}

impl CustomRecognizer {
    #[must_use]
    pub fn new(config: &SecretsConfig) -> Self {
        let compiled = config
            .patterns
            .iter()
            .filter_map(|p| {
                let re = regex::Regex::new(&p.regex).ok()?;
                let rule_id = p
                    .rule_id
                    .clone()
                    .unwrap_or_else(|| format!("TA-CUSTOM-{}", p.name.to_uppercase()));
                let base_score = match p.severity.to_uppercase().as_str() {
                    "CRITICAL" => 95,
                    "HIGH" => 85,
                    "MEDIUM" => 60,
                    _ => 40,
                };
                Some((re, rule_id, p.severity.clone(), base_score))
            })
            .collect();
        Self { compiled }
    }
}

impl SecretRecognizer for CustomRecognizer {
    fn scan_text(&self, content: &str, _file_path: &PathBuf) -> Vec<RawFinding> {
        let mut findings = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            for (re, rule_id, severity, base_score) in &self.compiled {
                if let Some(m) = re.find(line) {
                    findings.push(RawFinding {
                        line: idx + 1,
                        message: format!("Custom pattern '{rule_id}' matched"),
                        rule_id: rule_id.clone(),
                        severity: severity.clone(),
                        matched_value: Some(redact(m.as_str())),
                        entropy: None,
                        base_score: *base_score,
                    });
                }
            }
        }
        findings
    }
}
