pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer CLI - administration for the tour booking API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database schema management")]
    Schema {
        #[command(subcommand)]
        cmd: commands::schema::SchemaCommands,
    },

    #[command(about = "Sample dataset loading and cleanup")]
    Fixture {
        #[command(subcommand)]
        cmd: commands::fixture::FixtureCommands,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Schema { cmd } => commands::schema::run(cmd).await,
        Commands::Fixture { cmd } => commands::fixture::run(cmd).await,
    }
}
