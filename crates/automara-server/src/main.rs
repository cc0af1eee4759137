//! Automara Server - application entry point.

mod config;

use automara_db::DbManager;
use automara_db::repository::{
    SurrealActivityLogRepository, SurrealCredentialRepository, SurrealTenantRepository,
    SurrealWorkflowRepository,
};
use automara_engine::{EngineClient, HttpEngineClient};
use automara_provisioning::ProvisioningService;
use automara_vault::{CredentialService, CredentialVault};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Automara server...");

    let config = ServerConfig::from_env()?;

    // The vault refuses an empty master secret before anything else wires up.
    let vault = CredentialVault::new(config.master_secret)?;

    let db = DbManager::connect(&config.db).await?;
    automara_db::run_migrations(db.client()).await?;

    let engine = HttpEngineClient::new(&config.engine_url, config.engine_api_key)?;
    match engine.list_tags().await {
        Ok(tags) => info!(tags = tags.len(), "Remote engine reachable"),
        Err(e) => warn!(error = %e, "Remote engine not reachable at startup"),
    }

    let credentials = CredentialService::new(
        SurrealCredentialRepository::new(db.client().clone()),
        vault,
    );
    let provisioning = ProvisioningService::new(
        SurrealTenantRepository::new(db.client().clone()),
        SurrealWorkflowRepository::new(db.client().clone()),
        SurrealActivityLogRepository::new(db.client().clone()),
        engine,
    );

    // TODO: mount the HTTP route layer over these services.
    let _services = (credentials, provisioning);

    info!("Automara server ready.");
    tokio::signal::ctrl_c().await?;
    info!("Automara server stopped.");
    Ok(())
}
