//! Ballot daemon: entry point for running an election.

mod config;
mod scenario;

use std::path::PathBuf;
use std::sync::Arc;

use ballot_election::{BroadcastNotifier, Election};
use ballot_utils::LogFormat;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;

use crate::config::DaemonConfig;
use crate::scenario::{Scenario, ScriptedCaller};

#[derive(Parser)]
#[command(name = "ballot-daemon", about = "Single-election administrator")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BALLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario file against a fresh election and print the report.
    Run {
        /// Scenario file (TOML).
        scenario: PathBuf,

        /// Also print every published event to stdout as a JSON line.
        #[arg(long)]
        events: bool,

        /// Keep going after a step whose outcome differs from its expectation.
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    ballot_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            scenario: scenario_path,
            events,
            keep_going,
        } => {
            let script = Scenario::from_toml_file(&scenario_path)?;
            tracing::info!(
                administrator = %script.administrator,
                steps = script.steps.len(),
                "Starting election"
            );

            let access = Arc::new(ScriptedCaller::new(script.administrator.clone()));
            let notifier = Arc::new(BroadcastNotifier::new(config.event_capacity));
            let mut rx = notifier.subscribe();
            let listener = tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(event) => {
                            tracing::debug!(event = event.name(), "event published");
                            if events {
                                match serde_json::to_string(&event) {
                                    Ok(line) => println!("{line}"),
                                    Err(e) => tracing::warn!("Failed to encode event: {e}"),
                                }
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let election =
                Election::with_config(config.election.clone(), access.clone(), notifier.clone());
            let report = scenario::run(&script, &election, &access, keep_going);

            // Dropping every sender closes the channel and lets the listener drain.
            drop(election);
            drop(notifier);
            listener.await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
            tracing::info!(
                phase = %report.election.phase,
                unexpected = report.unexpected,
                "Election run finished"
            );
            if report.unexpected > 0 {
                anyhow::bail!(
                    "{} step(s) did not go as expected",
                    report.unexpected
                );
            }
        }
    }

    Ok(())
}
