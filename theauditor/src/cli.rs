use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.theauditor.toml):
  Create this file in your project root to set defaults.

  [theauditor]
  # Core settings
  confidence = 60            # Confidence threshold (0-100)
  secrets = true             # Enable secrets scanning
  danger = true              # Enable dangerous code scanning
  quality = true             # Enable quality checks
  include_tests = false      # Include test files in analysis
  include_ipynb = false      # Include Jupyter notebooks

  # Quality thresholds
  complexity = 10            # Max cyclomatic complexity
  nesting = 3                # Max nesting depth
  max_args = 5               # Max function arguments
  max_lines = 50             # Max function lines
  min_mi = 40.0              # Min Maintainability Index

  # Path filters
  exclude_folders = [\"build\", \"dist\", \".venv\"]
  include_folders = [\"src\"]  # Force-include these

  # CI/CD
  fail_threshold = 5.0       # Exit 1 if >N% unused code
";

/// Options for scan types (secrets, danger, quality).
#[derive(Args, Debug, Default, Clone)]
pub struct ScanOptions {
    /// Scan for API keys/secrets.
    #[arg(long)]
    pub secrets: bool,

    /// Scan for dangerous code (includes taint analysis).
    #[arg(long)]
    pub danger: bool,

    /// Scan for code quality issues.
    #[arg(long)]
    pub quality: bool,

    /// Suppress dead-code findings (unused functions/methods/classes/imports/variables/parameters),
    /// keeping only security and quality findings.
    #[arg(long)]
    pub no_dead: bool,
}

/// Positional path arguments shared by every subcommand: either a list of
/// paths, or `--root`, but never both (see `validate_path_args`).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Path(s) to analyze (files or directories).
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Analysis root. Mutually exclusive with positional paths; when set,
    /// it is both the analysis target and the containment boundary.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Output/path/exclusion options shared by the raw/cc/hal/mi metric subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct CommonArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Exclude folders
    #[arg(long, short = 'e', alias = "exclude-folder")]
    pub exclude: Vec<String>,

    /// Ignore directories matching glob pattern
    #[arg(long, short = 'i')]
    pub ignore: Vec<String>,

    /// Save output to file
    #[arg(long, short = 'O')]
    pub output_file: Option<String>,
}

/// Rank filtering options shared by the cc/mi subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct RankArgs {
    /// Set minimum rank (A-F for complexity, A-C for MI)
    #[arg(long, short = 'n', alias = "min")]
    pub min_rank: Option<char>,

    /// Set maximum rank (A-F for complexity, A-C for MI)
    #[arg(long, short = 'x', alias = "max")]
    pub max_rank: Option<char>,
}

/// Arguments for the `files` subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct FilesArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Exclude folders
    #[arg(long, alias = "exclude-folder")]
    pub exclude: Vec<String>,
}

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows files being analyzed).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only summary, time, and gate results (no detailed tables).
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 1 if any quality issues are found.
    #[arg(long)]
    pub fail_on_quality: bool,

    /// Generate HTML report.
    #[arg(long)]
    #[cfg(feature = "html_report")]
    pub html: bool,
}

/// Options for including additional files in analysis.
#[derive(Args, Debug, Default, Clone)]
pub struct IncludeOptions {
    /// Include test files in analysis.
    #[arg(long)]
    pub include_tests: bool,

    /// Include `IPython` Notebooks (.ipynb files) in analysis.
    #[arg(long)]
    pub include_ipynb: bool,

    /// Report findings at cell level for notebooks.
    #[arg(long)]
    pub ipynb_cells: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = CONFIG_HELP)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute (e.g., raw, cc, hal).
    pub command: Option<Commands>,

    /// Paths to analyze (files or directories).
    /// Can be a single directory, multiple files, or a mix of both.
    /// When no paths are provided, defaults to the current directory.
    #[command(flatten)]
    pub paths: PathArgs,

    /// Confidence threshold (0-100).
    /// Only findings with confidence higher than this value will be reported.
    #[arg(short, long)]
    pub confidence: Option<u8>,

    /// Scan type options (secrets, danger, quality).
    #[command(flatten)]
    pub scan: ScanOptions,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Include options for additional file types.
    #[command(flatten)]
    pub include: IncludeOptions,

    /// Folders to exclude from analysis.
    #[arg(long, alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include in analysis (overrides default exclusions).
    #[arg(long, alias = "include-folder")]
    pub include_folders: Vec<String>,

    /// Exit with code 1 if finding percentage exceeds this threshold (0-100).
    /// For CI/CD integration: --fail-threshold 5 fails if >5% of definitions are unused.
    #[arg(long)]
    pub fail_threshold: Option<f64>,

    /// Set maximum allowed Cyclomatic Complexity (overrides config).
    /// Findings with complexity > N will be reported.
    #[arg(long)]
    pub max_complexity: Option<usize>,

    /// Set minimum allowed Maintainability Index.
    /// Files with MI < N will be reported.
    #[arg(long)]
    pub min_mi: Option<f64>,

    /// Set maximum allowed nesting depth.
    #[arg(long)]
    pub max_nesting: Option<usize>,

    /// Set maximum allowed function arguments.
    #[arg(long)]
    pub max_args: Option<usize>,

    /// Set maximum allowed function lines.
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Add artificial delay (ms) per file for testing progress bar.
    #[arg(long, hide = true)]
    pub debug_delay: Option<u64>,
}

#[derive(Subcommand, Debug)]
/// Available subcommands for specific metric calculations.
pub enum Commands {
    /// Calculate raw metrics (LOC, LLOC, SLOC, Comments, Multi, Blank)
    Raw {
        #[command(flatten)]
        common: CommonArgs,

        /// Show summary of gathered metrics
        #[arg(long, short = 's')]
        summary: bool,
    },
    /// Calculate Cyclomatic Complexity
    Cc {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        rank: RankArgs,

        /// Show average complexity
        #[arg(long, short = 'a')]
        average: bool,

        /// Show total average complexity
        #[arg(long)]
        total_average: bool,

        /// Show complexity score with rank
        #[arg(long, short = 's')]
        show_complexity: bool,

        /// Ordering function (score, lines, alpha)
        #[arg(long, short = 'o')]
        order: Option<String>,

        /// Do not count assert statements
        #[arg(long)]
        no_assert: bool,

        /// Output XML
        #[arg(long)]
        xml: bool,

        /// Exit with code 1 if any block has complexity higher than this value
        #[arg(long)]
        fail_threshold: Option<usize>,
    },
    /// Calculate Halstead Metrics
    Hal {
        #[command(flatten)]
        common: CommonArgs,

        /// Compute metrics on function level
        #[arg(long, short = 'f')]
        functions: bool,
    },
    /// Calculate Maintainability Index
    Mi {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        rank: RankArgs,

        /// Count multiline strings as comments (enabled by default)
        #[arg(long, short = 'm', default_value = "true", action = clap::ArgAction::Set)]
        multi: bool,

        /// Show actual MI value
        #[arg(long, short = 's')]
        show: bool,

        /// Show average MI
        #[arg(long, short = 'a')]
        average: bool,

        /// Exit with code 1 if any file has MI lower than this value
        #[arg(long)]
        fail_threshold: Option<f64>,
    },
    /// Trace the blast radius of a symbol through the call/reference graph.
    Impact {
        #[command(flatten)]
        paths: PathArgs,

        /// Fully-qualified symbol name to trace (e.g. `module.Class.method`).
        symbol: String,

        /// Output JSON
        #[arg(long, short = 'j')]
        json: bool,

        /// Maximum graph traversal depth (unbounded if omitted).
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Start MCP server for LLM integration (Claude Desktop, VS Code Copilot, etc.)
    #[command(name = "mcp-server")]
    McpServer,
    /// Generate comprehensive project statistics report
    Stats {
        #[command(flatten)]
        paths: PathArgs,

        /// Enable all analysis: secrets, danger, quality, and per-file metrics
        #[arg(long, short = 'a')]
        all: bool,

        /// Scan for API keys/secrets
        #[arg(long, short = 's')]
        secrets: bool,

        /// Scan for dangerous code patterns
        #[arg(long, short = 'd')]
        danger: bool,

        /// Scan for code quality issues
        #[arg(long, short = 'q')]
        quality: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Output file path
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Exclude folders
        #[arg(long, alias = "exclude-folder")]
        exclude: Vec<String>,
    },
    /// Show per-file metrics table
    Files {
        #[command(flatten)]
        args: FilesArgs,
    },

    /// Create a default `.theauditor.toml`/`pyproject.toml` section and `.gitignore` entry.
    Init,

    /// Run the full four-stage pipeline (index, resolve, analyze, correlate).
    Full {
        #[command(flatten)]
        opts: PipelineArgs,
    },

    /// Deprecated alias for `full`.
    Index {
        #[command(flatten)]
        opts: PipelineArgs,
    },

    /// Compute and persist a workset without running the rest of the pipeline.
    Workset {
        #[command(flatten)]
        args: PathArgs,

        /// Analyze every file in the manifest.
        #[arg(long, conflicts_with_all = ["diff", "files"])]
        all: bool,

        /// Analyze files changed against a git spec (e.g. `HEAD~1`).
        #[arg(long, conflicts_with_all = ["all", "files"])]
        diff: Option<String>,

        /// Analyze an explicit file list.
        #[arg(long, conflicts_with_all = ["all", "diff"], num_args = 0..)]
        files: Vec<PathBuf>,

        #[arg(long)]
        include: Vec<String>,

        #[arg(long)]
        exclude: Vec<String>,

        #[arg(long, default_value_t = 2)]
        max_depth: usize,

        #[arg(long)]
        json: bool,
    },

    /// Orchestrate the linter/secrets/danger/quality rule phase over the workset.
    Lint {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Run the FCE correlator only; assumes raw findings already exist.
    Fce {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long, default_value_t = 2)]
        min_vectors: usize,

        #[arg(long)]
        json: bool,
    },

    /// Parse dependency manifests across every supported ecosystem.
    Deps {
        #[command(flatten)]
        args: PathArgs,

        /// Query registries for each dependency's latest version.
        #[arg(long)]
        check_latest: bool,

        /// Rewrite manifests in place to their latest resolved versions.
        #[arg(long)]
        upgrade_all: bool,

        /// Allow pre-release versions when checking/upgrading.
        #[arg(long)]
        allow_prerelease: bool,

        /// Never touch the network.
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        vuln_scan: bool,

        #[arg(long)]
        json: bool,
    },

    /// Report dead modules/functions/classes from the indexed store.
    Deadcode {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        include_tests: bool,

        #[arg(long)]
        json: bool,
    },

    /// Report findings tagged with the docker/container category.
    DockerAnalyze {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Report findings tagged with the terraform/IaC category.
    Terraform {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Report cross-framework boundary findings (e.g. orm/graphql/react overlaps).
    Boundaries {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Report workflow/CI-related findings.
    Workflows {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print structural metrics (complexity, centrality) recorded for the repo.
    Structure {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Assemble an AI context bundle for a single file.
    Explain {
        /// The repo-relative file to explain.
        file: PathBuf,

        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// List available patterns and rule functions (no analysis performed).
    Rules {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Session-log analysis subcommands.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },

    /// Print the last correlated FCE report.
    Report {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print the summary counts from the last run.
    Summarize {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Analyze recorded session history (interface-only; out of scope per spec).
    Analyze {
        #[command(flatten)]
        args: PathArgs,

        #[arg(long)]
        json: bool,
    },
}

/// Flags shared by `full`/`index`, matching spec §6's `RunOptions`.
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Suppress the live progress dashboard; print only the final report.
    #[arg(long)]
    pub quiet: bool,

    /// Never touch the network (dependency registry lookups, doc fetches).
    #[arg(long)]
    pub offline: bool,

    /// Exclude this tool's own source tree from the workset.
    #[arg(long)]
    pub exclude_self: bool,

    /// Run the taint tracker's subprocess-isolated mode.
    #[arg(long)]
    pub subprocess_taint: bool,

    /// Truncate the store's per-run tables (and, with this flag, the
    /// extraction tables too) before running.
    #[arg(long)]
    pub wipecache: bool,

    #[arg(long)]
    pub json: bool,
}
