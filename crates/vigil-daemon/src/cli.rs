//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Vigil - watches what you do, keeps what it learns, and decides when to speak up.
#[derive(Debug, Parser)]
#[command(name = "vigil")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path (overrides [store].path)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Model name (overrides [llm].model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log filter, e.g. "debug" or "vigil_reconciler=debug" (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
