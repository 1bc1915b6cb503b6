//! Vigil - proactive assistant daemon.

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use vigil_daemon::{Cli, VigilConfig, VigilDaemon};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = VigilConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_overrides(&cli);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let daemon = VigilDaemon::from_config(&config).context("starting vigil")?;
    let input = BufReader::new(tokio::io::stdin());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    daemon.serve(input, shutdown).await?;
    Ok(())
}

/// Logs go to stderr; stdin carries signals
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
