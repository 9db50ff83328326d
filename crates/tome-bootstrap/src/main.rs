//! Tome bootstrap — application entry point.
//!
//! Connects to the database, applies pending schema migrations, and
//! verifies the deployment configuration, leaving the installation ready
//! for the transport layer that serves it.

use tracing_subscriber::EnvFilter;

use tome_db::{DbConfig, DbError, DbManager, run_migrations};
use tome_provision::ProvisionConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tome=info".parse().unwrap()))
        .json()
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "bootstrap failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DbError> {
    dotenvy::dotenv().ok();

    let provision_config = ProvisionConfig::from_env();
    tracing::info!(
        deployment_mode = ?provision_config.deployment_mode,
        "starting Tome bootstrap"
    );

    let db_config = DbConfig::from_env();
    let manager = DbManager::connect(&db_config).await?;
    run_migrations(manager.db()).await?;

    tracing::info!("database schema is up to date");
    Ok(())
}
