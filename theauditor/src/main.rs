//! Legacy standalone binary entry point for `TheAuditor`.
//!
//! The primary binary is `theauditor-cli`, which also wires up the
//! `mcp-server` subcommand. This target is kept for callers invoking the
//! library crate's own binary directly; it shares all argument parsing and
//! dispatch logic with `theauditor-cli` via `entry_point::run_with_args`.

use anyhow::Result;
use theauditor::entry_point;

fn main() -> Result<()> {
    let code = entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
