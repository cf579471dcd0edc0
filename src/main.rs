//! # RBAC API Main Entry Point

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};

use rbac::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Parser)]
#[command(name = "rbac", about = "Multi-tenant RBAC API service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations and exit
    Migrate,
    /// Run migrations, then seed the canonical permissions and roles
    Seed,
    /// Start the API server (the default when no subcommand is given)
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config);

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!("Configuration: {}", redacted_json);
    }

    let pool = db::init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            Migrator::up(&pool, None).await?;
            tracing::info!("Migrations applied");
        }
        Command::Seed => {
            Migrator::up(&pool, None).await?;
            seeds::run(&pool).await?;
            tracing::info!("Seeding completed");
        }
        Command::Serve => {
            run_server(config, pool).await?;
        }
    }

    Ok(())
}
