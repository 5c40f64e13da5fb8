//! kubectl-storageos
//!
//! Entry point: parses the command line, sets up logging, assembles the
//! configuration chain and API client, then runs the requested command.
//! Errors are printed to standard error and mapped to exit codes.

use clap::Parser;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use kubectl_storageos::cmd::{self, Cli, Command, CommandContext};
use kubectl_storageos::config::{build_provider, environment::process_env, ConfigProvider};
use kubectl_storageos::{Client, Error, HttpTransport, Result};

// =============================================================================
// Main
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.cli_log_level, cli.cli_log_json) {
        eprintln!("error: {}", e);
        return std::process::ExitCode::from(e.exit_code() as u8);
    }

    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Command::Version = cli.command {
        return cmd::version(&mut out);
    }

    let config = build_provider(cli.global, process_env())?;
    let endpoints = config.api_endpoints()?;
    debug!(?endpoints, "using API endpoints");

    let transport = HttpTransport::new(&endpoints)?;
    let client = Client::new(Arc::new(transport));
    let ctx = CommandContext::new(config, client)?;

    cmd::execute(cli.command, &ctx, &mut out).await
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(level: &str, json: bool) -> Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| Error::Configuration(format!("invalid log level: {}", level)))?;

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for quiet in ["hyper=warn", "reqwest=warn", "rustls=warn"] {
        let directive: Directive = quiet
            .parse()
            .map_err(|e| Error::Internal(format!("invalid log directive {}: {}", quiet, e)))?;
        filter = filter.add_directive(directive);
    }

    // Logs go to stderr so they never mix with command output
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
