//! Status tracker CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use status_tracker::{
    error::Result,
    models::Config,
    output,
    pipeline::{self, CycleOutcome, shutdown},
};

/// status-tracker - reports new status page incident updates
#[derive(Parser, Debug)]
#[command(
    name = "status-tracker",
    version,
    about = "Polls status pages and reports new incident updates"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll all providers until interrupted (default)
    Run,

    /// Poll every provider once and print the current updates
    Check,

    /// Validate the configuration file
    Validate,

    /// Print the effective configuration (defaults if the file is missing)
    Config,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Command::Run);

    // Only `config` may fall back to the built-in defaults.
    let config = match command {
        Command::Config => Config::load_or_default(&cli.config),
        _ => Config::load(&cli.config).inspect_err(|e| log::error!("{}", e))?,
    };
    let sink = output::sink_for(config.output.format);

    match command {
        Command::Run => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!(
                "Tracking {} provider(s), polling every {}s. Press Ctrl+C to stop.",
                config.providers.len(),
                config.tracker.poll_interval_secs
            );

            let (stop_tx, stop_rx) = shutdown::channel();
            tokio::spawn(async move {
                shutdown::wait_for_signal().await;
                let _ = stop_tx.send(true);
            });

            let summary = pipeline::run_tracker(&config, sink, stop_rx).await?;
            for name in &summary.crashed {
                log::error!("Monitor for {} stopped unexpectedly", name);
            }
            log::info!(
                "Tracker stopped after reporting {} update(s)",
                summary.updates_reported()
            );
        }

        Command::Check => {
            let outcomes = pipeline::run_check(&config, sink).await?;
            for (name, outcome) in &outcomes {
                match outcome {
                    CycleOutcome::Reported(count) => {
                        log::info!("{}: {} update(s)", name, count)
                    }
                    CycleOutcome::Unchanged => log::info!("{}: not modified", name),
                    CycleOutcome::Failed => log::warn!("{}: fetch failed", name),
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} providers)", config.providers.len());
        }

        Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
