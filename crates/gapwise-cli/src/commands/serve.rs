//! Serve command - run the validation HTTP server.

use colored::Colorize;

use super::CommandResult;
use crate::server::{app, state::AppState};

pub fn run(port: u16, max_body_mb: usize, verbose: bool) -> CommandResult {
    if max_body_mb == 0 {
        return Err("--max-body-mb must be at least 1".into());
    }
    let state = AppState::new().with_body_limit(max_body_mb.saturating_mul(1024 * 1024));

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting validation server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  POST {}/api/validate-series", url);
    println!("  POST {}/api/profile", url);
    println!("  GET  {}/api/health", url);
    println!("  Request bodies up to {} MB", max_body_mb);
    if verbose {
        println!();
        println!("  Request logging enabled");
    }
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let shutdown = async {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
        };

        app::run_server(state, port, shutdown).await
    })
}
