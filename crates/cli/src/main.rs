//! Battle Armory CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! armory-cli migrate
//!
//! # Reserve a username on the registration allow-list
//! armory-cli pre-register -u night_owl
//!
//! # Grant or revoke the admin capability
//! armory-cli promote -u night_owl
//! armory-cli demote -u night_owl
//!
//! # Run a lifecycle sweep immediately instead of waiting for the schedule
//! armory-cli sweep expiry
//! armory-cli sweep purge
//! armory-cli sweep all
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "armory-cli")]
#[command(author, version, about = "Battle Armory CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Reserve a username on the registration allow-list
    PreRegister {
        /// Username to reserve
        #[arg(short, long)]
        username: String,
    },
    /// Grant the admin capability to an account
    Promote {
        /// Username of the account
        #[arg(short, long)]
        username: String,
    },
    /// Revoke the admin capability from an account
    Demote {
        /// Username of the account
        #[arg(short, long)]
        username: String,
    },
    /// Run a lifecycle sweep immediately
    Sweep {
        #[command(subcommand)]
        target: SweepTarget,
    },
}

#[derive(Subcommand)]
enum SweepTarget {
    /// Mark items whose expiry has passed
    Expiry,
    /// Delete expired items past the grace period
    Purge,
    /// Run both sweeps, expiry first
    All,
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
        Commands::PreRegister { username } => commands::users::pre_register(&username).await?,
        Commands::Promote { username } => commands::users::set_admin(&username, true).await?,
        Commands::Demote { username } => commands::users::set_admin(&username, false).await?,
        Commands::Sweep { target } => match target {
            SweepTarget::Expiry => commands::sweep::expiry().await?,
            SweepTarget::Purge => commands::sweep::purge().await?,
            SweepTarget::All => {
                commands::sweep::expiry().await?;
                commands::sweep::purge().await?;
            }
        },
    }
    Ok(())
}
