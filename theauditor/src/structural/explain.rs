//! Renders a [`super::DeadCodeFinding`] into the specific set-difference
//! reason a human asked for, rather than the generic finding message.
//! Grounded on `original_source/theauditor/context/deadcode.py`'s
//! `_format_text` output, consumed by the `explain` CLI command.

use super::{DeadCodeFinding, DeadKind};

#[must_use]
pub fn describe(finding: &DeadCodeFinding) -> String {
    match finding.kind {
        DeadKind::Module => format!(
            "{} has {} symbol(s) but no caller was found in refs, assignments.source_expr, \
             function_call_args.argument_expr, or variable_usage. {}",
            finding.path, finding.symbol_count, finding.reason
        ),
        DeadKind::Function => format!(
            "{}:{} — function/method '{}' never appears as a function_call_args.callee_function \
             or a bare variable_usage entry. {}",
            finding.path, finding.line, finding.name, finding.reason
        ),
        DeadKind::Class => format!(
            "{}:{} — class '{}' is never instantiated (function_call_args.callee_function), \
             referenced (variable_usage, refs.value), or mentioned in an assignment's source \
             expression. {}",
            finding.path, finding.line, finding.name, finding.reason
        ),
    }
}
