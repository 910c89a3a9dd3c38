//! Tube Fetcher CLI application
//!
//! Command-line interface for the durable download queue: enqueue
//! acquisitions, inspect queue and history, manage naming templates, and
//! move library snapshots between machines.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tube_fetcher::cli::{
    handle_add, handle_history, handle_queue, handle_snapshot, handle_template, Cli, Commands,
};
use tube_fetcher::config::AppConfig;
use tube_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(&cli);

    info!("Tube Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    // Make sure a config file exists on first run
    AppConfig::initialize_first_run().await?;

    // Execute the appropriate command
    match cli.command {
        Commands::Add(args) => {
            info!("Executing add command");
            handle_add(args, &cli.global).await
        }
        Commands::Queue(args) => {
            info!("Executing queue command");
            handle_queue(args, &cli.global).await
        }
        Commands::History(args) => {
            info!("Executing history command");
            handle_history(args, &cli.global).await
        }
        Commands::Template(args) => {
            info!("Executing template command");
            handle_template(args, &cli.global).await
        }
        Commands::Snapshot(args) => {
            info!("Executing snapshot command");
            handle_snapshot(args, &cli.global).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    // Create environment filter
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("tube_fetcher={}", log_level).parse().unwrap());

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
