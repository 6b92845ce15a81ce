use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridclip")]
#[command(author, version, about = "On-chain clip mosaic: log-cache proxy and tooling")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the log-cache HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Seed or extend the historical cache tier from chain logs
    Backfill {
        /// First block to sweep (defaults to the configured deploy block)
        #[arg(long)]
        from_block: Option<u64>,

        /// Last block to sweep (defaults to the chain head)
        #[arg(long)]
        to_block: Option<u64>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
