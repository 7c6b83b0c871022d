//! IT Solutions CLI - session migrations and backend inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the Postgres session store
//! its-cli migrate sessions
//!
//! # Dump the catalog as JSON
//! its-cli backend products
//! its-cli backend services
//!
//! # Grant a role (the token must belong to an admin)
//! its-cli backend assign-role --user 2vxsx-fae --role admin --token "$ADMIN_TOKEN"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use itsolutions_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "its-cli")]
#[command(author, version, about = "IT Solutions storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Query or manage the backend canister
    Backend {
        #[command(subcommand)]
        action: BackendAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the session store table
    Sessions,
}

#[derive(Subcommand)]
enum BackendAction {
    /// Print all store products as JSON
    Products,
    /// Print all services as JSON
    Services,
    /// Print the site branding as JSON
    Branding,
    /// Report whether Stripe is configured
    StripeStatus,
    /// Assign a role to a user
    AssignRole {
        /// Principal of the user to update
        #[arg(short, long)]
        user: String,

        /// Role to assign (`admin`, `user`, `guest`)
        #[arg(short, long, default_value = "user")]
        role: UserRole,

        /// Delegation token of an admin caller
        #[arg(short, long, env = "BACKEND_ADMIN_TOKEN", hide_env_values = true)]
        token: String,

        /// Principal the token belongs to
        #[arg(long, default_value = "cli")]
        principal: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Backend { action } => match action {
            BackendAction::Products => commands::backend::products().await?,
            BackendAction::Services => commands::backend::services().await?,
            BackendAction::Branding => commands::backend::branding().await?,
            BackendAction::StripeStatus => commands::backend::stripe_status().await?,
            BackendAction::AssignRole {
                user,
                role,
                token,
                principal,
            } => commands::backend::assign_role(&user, role, token, &principal).await?,
        },
    }
    Ok(())
}
