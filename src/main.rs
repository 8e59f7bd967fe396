mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use statfetch::config::Config;
use statfetch::football;
use statfetch::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Run(args) => {
            let mut downloader = football::build_downloader(&config, &args.namespace)?;
            let report =
                football::run_for_date(&mut downloader, &config.api.base_url, args.date).await?;
            tracing::info!(?report, "Run complete");
        }
        Commands::Ongoing(args) => {
            let mut downloader = football::build_downloader(&config, &args.namespace)?;
            let report =
                football::run_ongoing(&mut downloader, &config.api.base_url, args.date).await?;
            tracing::info!(?report, "Ongoing run complete");
        }
    }

    Ok(())
}
