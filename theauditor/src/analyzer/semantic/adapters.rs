//! Adapters bridging the semantic graph (imports, reachability) to the
//! standalone per-file analyses that benefit from cross-file context:
//! taint analysis, metrics, and auto-fix generation.

/// Bridges the semantic graph's resolved imports into the taint analyzer's
/// cross-file registry before running a project-wide taint pass.
pub mod taint;

/// Bridges semantic-graph reachability facts into per-file metrics.
pub mod metrics;

/// Generates suggested fixes for unreachable symbols using semantic-graph context.
pub mod autofix;
