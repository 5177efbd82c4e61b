//! gitkit CLI
//!
//! Runs git operations through the gitkit engine and prints structured JSON.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log verbosity (default: `gitkit=warn`, `gitkit=debug` with `-v`)
//! - `GITKIT_CONFIG`: config file path
//! - `GITKIT_*`: engine setting overrides, see `EngineConfig::apply_env`
//!
//! Results go to stdout. Engine failures are printed to stdout as a JSON
//! error record and exit with status 1; logs and usage errors go to stderr.

mod cli;
mod commands;
mod error;
mod serve;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use gitkit_engine::{CliGitProvider, EngineConfig, RequestContext};

use cli::{Cli, Commands};
use error::{CliError, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => {}
        Err(CliError::Engine(e)) => {
            let record = e.to_record();
            match serde_json::to_string(&record) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("{}: {}", "error".red().bold(), e),
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gitkit=debug" } else { "gitkit=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "gitkit", &mut std::io::stdout());
        return Ok(());
    }

    let config = EngineConfig::resolve(cli.config.as_deref())?;
    tracing::debug!(?config, "Resolved configuration");

    if cli.command == Commands::Config {
        return commands::run_config(&config);
    }

    let provider = CliGitProvider::new(config);

    match cli.command {
        Commands::Run {
            operation,
            options,
            cwd,
            tenant,
            trace_id,
            pretty,
        } => {
            let request = RequestContext::from_parts(tenant.as_deref(), None, trace_id.as_deref());
            commands::run_operation(&provider, &operation, &options, &cwd, request, pretty).await
        }
        Commands::Capabilities { pretty } => commands::run_capabilities(&provider, pretty),
        Commands::Serve => {
            tracing::info!("Serving requests on stdin");
            let reader = tokio::io::BufReader::new(tokio::io::stdin());
            serve::serve(&provider, reader, tokio::io::stdout()).await
        }
        Commands::Config | Commands::Completions { .. } => Ok(()),
    }
}
