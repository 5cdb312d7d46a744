use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marketsignal", about = "AI market signals for Telegram and Discord")]
pub struct Cli {
    /// Watch-list file (defaults to ./marketsignal.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the signal loop and the Telegram command listener until Ctrl-C
    Run,
    /// Run a single cycle and exit
    Once {
        /// Print messages to stdout instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the signal for one symbol, as the chat commands would
    Signal {
        symbol: String,
        /// Instrument kind (equity, forex, commodity); detected when omitted
        #[arg(long)]
        kind: Option<String>,
    },
    /// List unusual options activity for a ticker
    Options { ticker: String },
    /// Show the configured watch list with effective thresholds
    Instruments,
}
