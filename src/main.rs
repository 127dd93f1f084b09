use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkout_callback::application::commands::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    commands::execute(cli.command).await
}
