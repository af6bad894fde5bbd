//! Delivery CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! delivery-cli migrate
//!
//! # Create an admin user (password from -p or ADMIN_PASSWORD)
//! delivery-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Load menu items from a YAML file
//! delivery-cli seed menu data/menu.yaml
//! ```
//!
//! All commands read `DATABASE_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "delivery-cli")]
#[command(author, version, about = "Delivery platform CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (falls back to the `ADMIN_PASSWORD` environment variable)
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert menu items from a YAML file, skipping names already on the menu
    Menu {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name, password } => {
                commands::admin::create_user(&email, &name, password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Menu { file } => commands::seed::menu(&file).await?,
        },
    }
    Ok(())
}
