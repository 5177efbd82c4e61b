//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// gitkit - run git operations safely and get structured JSON back
#[derive(Parser, Debug)]
#[command(name = "gitkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/gitkit/config.toml when present)
    #[arg(long, global = true, env = "GITKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run one git operation and print its result as JSON
    ///
    /// Examples:
    ///   gitkit run status
    ///   gitkit run log --options '{"max_count": 5}'
    ///   gitkit run branch -C ../other --options '{"action": "create", "name": "feature"}'
    Run {
        /// Operation name, e.g. status, log, commit
        operation: String,

        /// Operation options as a JSON object
        #[arg(short, long, default_value = "{}")]
        options: String,

        /// Repository to operate on
        #[arg(short = 'C', long, default_value = ".")]
        cwd: PathBuf,

        /// Tenant the call is attributed to
        #[arg(long)]
        tenant: Option<String>,

        /// Correlation id for log lines (generated when absent)
        #[arg(long)]
        trace_id: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print supported operations and their options
    Capabilities {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Answer newline-delimited JSON requests from stdin
    ///
    /// Working directories set with `set_working_directory` live for the
    /// lifetime of the process.
    Serve,

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    ///
    /// Examples:
    ///   gitkit completions bash > ~/.local/share/bash-completion/completions/gitkit
    ///   gitkit completions zsh > ~/.zfunc/_gitkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
