use clap::Parser;
use marketsignal::cli::commands::{Cli, Commands};
use marketsignal::config::{Credentials, WatchConfig};
use marketsignal::domain::values::instrument_kind::InstrumentKind;
use marketsignal::{Delivery, MarketSignal};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("marketsignal={}", cli.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_command(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = WatchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Instruments => {
            println!("{}", serde_json::to_string_pretty(&config.watchlist()?)?);
        }
        Commands::Run => {
            let creds = Credentials::from_env();
            MarketSignal::new(config, &creds, Delivery::Chat)?.serve().await?;
        }
        Commands::Once { dry_run } => {
            let creds = Credentials::from_env();
            let delivery = if dry_run { Delivery::Stdout } else { Delivery::Chat };
            let mut app = MarketSignal::new(config, &creds, delivery)?;
            let report = app.run_cycle().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Signal { symbol, kind } => {
            let command = match kind {
                Some(k) => k.parse::<InstrumentKind>()?.command(),
                None => "signal",
            };
            let app = MarketSignal::new(config, &Credentials::from_env(), Delivery::None)?;
            println!("{}", app.handle_command(command, &[symbol]).await);
        }
        Commands::Options { ticker } => {
            let app = MarketSignal::new(config, &Credentials::from_env(), Delivery::None)?;
            println!("{}", app.handle_command("options", &[ticker]).await);
        }
    }
    Ok(())
}
