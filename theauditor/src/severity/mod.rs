//! Severity normalization: every tool speaks its own severity dialect
//! (floats, small integers, English words); this module maps all of them
//! into the single closed set the rest of the pipeline orders and reports
//! on.

use std::cmp::Ordering;

/// The closed set every heterogeneous severity encoding normalizes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    Warning,
    Style,
    Unknown,
}

impl Severity {
    /// Rank used for ordering findings: lower is more severe. Ties within
    /// a rank are broken by tool-importance, then file, then line.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
            Self::Info => 4,
            Self::Warning => 5,
            Self::Style => 6,
            Self::Unknown => 7,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Style => "style",
            Self::Unknown => "unknown",
        }
    }

    /// Parses one of [`Self::as_str`]'s own outputs back into a variant,
    /// falling back to `Unknown` for anything else. Used when re-reading an
    /// already-normalized severity string out of the store.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "info" => Self::Info,
            "warning" => Self::Warning,
            "style" => Self::Style,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Any severity value a tool might hand us: a numeric confidence, a small
/// integer code, or a free-text word.
#[derive(Debug, Clone)]
pub enum RawSeverity<'a> {
    Float(f64),
    Int(i64),
    Text(&'a str),
}

/// Normalizes a heterogeneous severity encoding into the closed set.
///
/// - Floats in `[0, 1]`: `>= 0.9` critical, `>= 0.7` high, `>= 0.4` medium, else low.
/// - Integers follow the Docker-style `0..4` scale: info, low, medium, high, critical.
///   Out-of-range integers normalize to `unknown`.
/// - Text aliases per the recognized word list; anything else is `warning`.
///
/// Idempotent: normalizing an already-normalized value's string form
/// (`normalize(Text("critical"))`) returns the same variant.
#[must_use]
pub fn normalize(raw: &RawSeverity<'_>) -> Severity {
    match raw {
        RawSeverity::Float(f) => normalize_float(*f),
        RawSeverity::Int(i) => normalize_int(*i),
        RawSeverity::Text(s) => normalize_text(s),
    }
}

fn normalize_float(f: f64) -> Severity {
    if f >= 0.9 {
        Severity::Critical
    } else if f >= 0.7 {
        Severity::High
    } else if f >= 0.4 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn normalize_int(i: i64) -> Severity {
    match i {
        0 => Severity::Info,
        1 => Severity::Low,
        2 => Severity::Medium,
        3 => Severity::High,
        4 => Severity::Critical,
        _ => Severity::Unknown,
    }
}

fn normalize_text(s: &str) -> Severity {
    match s.to_lowercase().as_str() {
        "critical" | "fatal" | "blocker" => Severity::Critical,
        "error" | "major" => Severity::High,
        "warn" | "warning" => Severity::Medium,
        "note" | "debug" | "minor" | "low" => Severity::Low,
        "info" => Severity::Info,
        "style" => Severity::Style,
        "medium" => Severity::Medium,
        "high" => Severity::High,
        "unknown" => Severity::Unknown,
        _ => Severity::Warning,
    }
}

/// Fixed, closed tool-importance ordering: security-oriented tools sort
/// ahead of style/formatting tools when severities tie. Unlisted tools sort
/// after every listed one, in call order among themselves.
const TOOL_IMPORTANCE: &[&str] = &[
    "theauditor-taint",
    "theauditor-danger",
    "bandit",
    "semgrep",
    "mypy",
    "ruff",
    "eslint",
    "pylint",
    "pattern-detector",
    "prettier",
    "black",
];

/// Rank for the severity tie-breaker. Tools not in the closed list rank
/// after all listed tools, preserving a stable (but otherwise unspecified)
/// relative order among themselves.
#[must_use]
pub fn tool_importance_rank(tool: &str) -> usize {
    TOOL_IMPORTANCE
        .iter()
        .position(|&t| t == tool)
        .unwrap_or(TOOL_IMPORTANCE.len())
}

/// The ordering key for a finding: `(severity_rank, tool_importance_rank, file, line)`.
/// Sorting by this key yields the comparator required by the finding-ordering
/// invariant — a total order, stable on ties.
#[must_use]
pub fn ordering_key<'a>(
    severity: Severity,
    tool: &'a str,
    file: &'a str,
    line: usize,
) -> (u8, usize, &'a str, usize) {
    (severity.rank(), tool_importance_rank(tool), file, line)
}
