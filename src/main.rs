use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;

use trivia_api::config::Config;
use trivia_api::logging;
use trivia_api::seed::{apply_seed, SeedData};
use trivia_api::server::start_server;
use trivia_api::storage::{SqliteStorage, Storage};

#[derive(Parser)]
#[command(name = "trivia_api")]
#[command(about = "REST API for a trivia question bank")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides config.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load categories and questions into the database
    Seed {
        /// TOML seed file; the built-in starter set is used when omitted
        #[arg(long)]
        file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open(&config.database.path)?);
            start_server(storage, port).await?;
        }
        Commands::Seed { file } => {
            let seed = match file {
                Some(path) => SeedData::load(&path)?,
                None => SeedData::defaults(),
            };

            let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open(&config.database.path)?);
            match apply_seed(storage, seed).await {
                Ok((categories, questions)) => {
                    println!("✅ Seeded {categories} categories and {questions} questions");
                }
                Err(e) => {
                    error!("seeding failed: {}", e);
                    println!("❌ Seeding failed: {e}");
                }
            }
        }
    }
    Ok(())
}
