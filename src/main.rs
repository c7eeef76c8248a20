#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use formaid::Config;
use formaid::app::dispatch::dispatch;
use formaid::cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn parse_level(value: &str) -> Level {
    value.trim().parse().unwrap_or(Level::INFO)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {err}");
    }

    dispatch(cli, config).await
}
