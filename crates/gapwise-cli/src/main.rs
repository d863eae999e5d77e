//! gapwise CLI - forecasting data preparation.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Profile {
            file,
            json,
            overrides,
        } => commands::profile::run(file, json, overrides, cli.verbose),

        Commands::Validate {
            file,
            forecast,
            remote,
            json,
        } => commands::validate::run(file, forecast, remote, json, cli.verbose),

        Commands::Prepare {
            file,
            forecast,
            gaps,
            aggregations,
            output,
            format,
        } => commands::prepare::run(file, forecast, gaps, aggregations, output, format, cli.verbose),

        Commands::Serve { port, max_body_mb } => {
            commands::serve::run(port, max_body_mb, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "gapwise=debug,gapwise_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
