use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use roost::{config, db, server, social};

#[derive(Parser)]
#[command(name = "roost", version, about = "Microblogging social backend over SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server
    Serve,
    /// Recompute the cached reaction counters from the relation records
    Repair,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::RoostConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Repair => {
            let conn = db::open_database(config.resolved_db_path())?;
            let repaired = social::relations::rebuild_counters(&conn)?;
            if repaired == 0 {
                println!("All reaction counters already match their relation records.");
            } else {
                println!("Repaired counters on {repaired} post(s).");
            }
        }
    }

    Ok(())
}
