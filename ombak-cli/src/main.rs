//! ## ombak-cli
//! **Operational entrypoint for the wave monitor**
//!
//! Wires the external measurement stream into the monitoring engine, either
//! live (NDJSON on stdin or a file) or as a deterministic replay of a
//! recorded stream.

use clap::Parser;

use ombak_telemetry::logging::EventLogger;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(run_args) => commands::run_monitoring(run_args).await,
        Commands::Replay(replay_args) => commands::run_replay(replay_args).await,
        Commands::CheckConfig(check_args) => commands::check_config(check_args),
    }
}
