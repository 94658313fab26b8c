//! Taskie CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! taskie-cli migrate
//!
//! # List users with role and capabilities
//! taskie-cli user list
//!
//! # Grant or revoke the admin role
//! taskie-cli user promote --email admin@example.com
//! taskie-cli user demote --email admin@example.com
//! ```
//!
//! Registration over HTTP always creates plain users, so the first admin is
//! promoted here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use taskie_core::Role;

mod commands;

#[derive(Parser)]
#[command(name = "taskie-cli")]
#[command(author, version, about = "Taskie CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,
    /// Give a user the admin role
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin to the user role
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
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
        Commands::User { action } => match action {
            UserAction::List => commands::user::list().await?,
            UserAction::Promote { email } => commands::user::set_role(&email, Role::Admin).await?,
            UserAction::Demote { email } => commands::user::set_role(&email, Role::User).await?,
        },
    }
    Ok(())
}
