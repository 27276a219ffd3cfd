//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod pick;

use clap::{Parser, Subcommand};

/// Pick source and destination nodes and render the route between them
#[derive(Parser)]
#[command(name = "route-picker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve points to graph nodes and render markers and route
    Pick(pick::PickArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pick(args) => pick::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
