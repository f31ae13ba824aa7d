//! Commands module - CLI subcommand implementations.
//!
//! This module contains the implementations for all CLI subcommands,
//! organized by analysis type.

mod cc;
mod hal;
mod impact;
mod init;
mod mi;
mod pipeline_cmds;
mod query_cmds;
mod raw;
mod stats;
mod utils;

// Re-export all public items
pub use cc::{run_cc, CcOptions};
pub use hal::run_hal;
pub use impact::run_impact;
pub use init::run_init;
pub use mi::{run_mi, MiOptions};
pub use pipeline_cmds::{
    run_deps, run_fce, run_full, run_lint, run_workset, DepsOptions, FullOptions, WorksetOptions,
};
pub use query_cmds::{
    run_boundaries, run_deadcode, run_docker_analyze, run_explain, run_report, run_rules,
    run_session_analyze, run_structure, run_summarize, run_terraform, run_workflows,
};
pub use raw::run_raw;
#[allow(deprecated)]
pub use stats::run_stats;
pub use stats::{run_files, run_stats_v2};
