use log::{error, info};
use std::process;

use dwh_publisher::{
    catalog::{CatalogClient, ReqwestHttpClient},
    config::{CatalogConfig, ManifestConfig},
    manifest::Manifest,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let catalog_config = CatalogConfig::new().map_err(|e| {
        error!("Failed to initialize catalog config: {}", e);
        e
    })?;

    let manifest_config = ManifestConfig::new().map_err(|e| {
        error!("Failed to initialize manifest config: {}", e);
        e
    })?;

    let workspace = Manifest::load(&manifest_config.manifest_path)
        .and_then(Manifest::into_workspace)
        .map_err(|e| {
            error!("Failed to load manifest {}: {}", manifest_config.manifest_path, e);
            e
        })?;

    let http = ReqwestHttpClient::new(catalog_config.timeout()).map_err(|e| {
        error!("Failed to create HTTP client: {}", e);
        e
    })?;

    let client = CatalogClient::new(http, catalog_config.api_base.as_str())
        .with_settle(catalog_config.settle_strategy());

    if let Err(e) = workspace.publish(&client).await {
        error!("Publishing workspace {} failed: {}", workspace.id(), e);
        process::exit(1);
    }

    info!("Workspace {} is up to date", workspace.id());
    Ok(())
}
