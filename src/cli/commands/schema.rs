use clap::Subcommand;

use crate::database::{schema, DatabaseManager};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Create the entity tables and indexes if missing")]
    Init,
}

pub async fn run(cmd: SchemaCommands) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Init => {
            let pool = DatabaseManager::pool().await?;
            schema::ensure(&pool).await?;
            println!("schema ready");
            Ok(())
        }
    }
}
