//! Schema migration tool for shortlink.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! cargo run --bin migrate -- up
//!
//! # Revert everything
//! cargo run --bin migrate -- down
//!
//! # Revert down to a given version
//! cargo run --bin migrate -- down --target 20250301000000
//!
//! # Show known migrations and whether they are applied
//! cargo run --bin migrate -- info
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: PostgreSQL connection

use shortlink::config::Config;
use shortlink::infrastructure::persistence::MIGRATOR;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use sqlx::migrate::Migrate;
use std::collections::HashSet;

/// Schema migration tool for shortlink.
#[derive(Parser)]
#[command(name = "migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Up,

    /// Revert applied migrations newer than the target version
    Down {
        /// Version to revert to; 0 reverts everything
        #[arg(short, long, default_value_t = 0)]
        target: i64,
    },

    /// List migrations and their state
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Up => up(&pool).await?,
        Commands::Down { target } => down(&pool, target).await?,
        Commands::Info => info(&pool).await?,
    }

    pool.close().await;
    Ok(())
}

async fn up(pool: &PgPool) -> Result<()> {
    println!("{}", "Applying migrations...".bright_blue());

    MIGRATOR
        .run(pool)
        .await
        .context("Failed to apply migrations")?;

    println!("{}", "Schema is up to date".green().bold());
    Ok(())
}

async fn down(pool: &PgPool, target: i64) -> Result<()> {
    println!(
        "{} {}",
        "Reverting migrations down to version".bright_blue(),
        target.to_string().bright_white().bold()
    );

    MIGRATOR
        .undo(pool, target)
        .await
        .context("Failed to revert migrations")?;

    println!("{}", "Revert complete".green().bold());
    Ok(())
}

/// Prints every known migration with its applied state.
///
/// ```text
///   Version          Description              State
///   20250301000000   create short links       applied
/// ```
async fn info(pool: &PgPool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table()
        .await
        .context("Failed to read migration table")?;

    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await
        .context("Failed to list applied migrations")?
        .into_iter()
        .map(|m| m.version)
        .collect();

    println!(
        "  {:<16} {:<32} {}",
        "Version".bright_white().bold(),
        "Description".bright_white().bold(),
        "State".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for migration in MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
    {
        let state = if applied.contains(&migration.version) {
            "applied".green()
        } else {
            "pending".yellow()
        };

        println!(
            "  {:<16} {:<32} {}",
            migration.version.to_string().bright_black(),
            migration.description.cyan(),
            state
        );
    }

    println!();
    Ok(())
}
