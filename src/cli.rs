use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quickbug")]
#[command(about = "QuickBug report ingestion server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP ingestion server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides configuration)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
