mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use quickbug::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => {
            let mut config = match args.config {
                Some(path) => Config::load_from_path(path)?,
                None => Config::load()?,
            };
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }

            quickbug::api::run(config).await?;
        }
    }

    Ok(())
}
