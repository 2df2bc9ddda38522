//! Applies, rolls back or reports the embedded schema migrations.
//!
//! Run with: cargo run --bin migration -- up

use anyhow::Context;
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use storefront_api::migrator::Migrator;

#[derive(Parser)]
#[command(name = "migration", about = "Storefront schema migrations")]
struct Cli {
    /// Database to migrate
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://storefront.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending migrations (default)
    Up {
        /// Only apply this many
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and reapply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    info!("Connecting to database: {}", cli.database_url);

    let mut options = ConnectOptions::new(cli.database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("failed to connect to database")?;

    match cli.command.unwrap_or(Command::Up { steps: None }) {
        Command::Up { steps } => {
            Migrator::up(&db, steps).await.context("migration failed")?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&db, Some(steps))
                .await
                .context("rollback failed")?;
            info!("Rolled back {} migration(s)", steps);
        }
        Command::Status => {
            Migrator::status(&db).await.context("status failed")?;
        }
        Command::Fresh => {
            Migrator::fresh(&db).await.context("fresh migration failed")?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
