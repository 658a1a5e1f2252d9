//! Sillage CLI - database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sillage migrate
//!
//! # Load perfumes, images and stock from YAML
//! sillage seed catalog catalog.yaml
//!
//! # Hash the admin password for ADMIN_PASSWORD_HASH
//! sillage admin hash-password 'correct horse battery staple'
//!
//! # Collapse duplicate cart rows for one account
//! sillage cart dedupe --user 42
//! ```
//!
//! # Environment Variables
//!
//! - `SILLAGE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sillage")]
#[command(author, version, about = "Sillage CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Admin panel helpers
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Cart maintenance
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert perfumes, images and stock from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Print an argon2 PHC hash for `ADMIN_PASSWORD_HASH`
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Collapse duplicate cart rows for one account
    Dedupe {
        /// Account user id
        #[arg(short, long)]
        user: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::HashPassword { password } => commands::admin::hash_password(&password)?,
        },
        Commands::Cart { action } => match action {
            CartAction::Dedupe { user } => commands::cart::dedupe(user).await?,
        },
    }
    Ok(())
}
