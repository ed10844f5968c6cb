//! CLI interface for depthsync
//!
//! Provides subcommands for:
//! - `watch`: stream one instrument's reconciled book to the log
//! - `config`: show effective configuration

mod watch;

pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "depthsync")]
#[command(about = "Live order book synchronizer for exchange WebSocket depth feeds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream an instrument's order book
    Watch(WatchArgs),
    /// Show effective configuration
    Config,
}
