use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stratum")]
#[command(version, about = "Find TODOs and the commits that introduced them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub enum Commands {
    /// Print a report of the TODOs in a repository
    Todos(TodosArgs),
}

#[derive(Parser, Debug)]
pub struct TodosArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Output file (if not specified, writes to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter: only show TODOs older than the given age (e.g., "30days", "6months", "1y")
    #[arg(long)]
    pub older_than: Option<String>,

    /// Filter: only show TODOs introduced by a specific author
    #[arg(long)]
    pub author: Option<String>,

    /// Path to custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Give up on blame after this long (e.g., "30s", "5m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Stop walking history once this many TODOs have been attributed
    #[arg(long)]
    pub stop_after: Option<usize>,

    /// Only follow the first parent of merge commits
    #[arg(long)]
    pub first_parent: bool,

    /// Skip history lookup entirely
    #[arg(long)]
    pub no_blame: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table output for terminal
    Terminal,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}
