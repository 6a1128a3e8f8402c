use std::sync::Arc;

use specify_client::{ServeOptions, Specify, SpecifyError};
use specify_domain::config::{ConfigError, SdkConfig};
use specify_domain::model::{KeyFormatError, PublisherKey};
use specify_domain::services::telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
use specify_domain::session::MemorySessionStore;
use specify_storage::{JsonFileSessionStore, SeaOrmSessionStore};
use thiserror::Error;
use tracing::info;

/// Resolves one ad for the wallet addresses given on the command line and
/// prints the outcome. Cache tiers come from the environment: database first,
/// then snapshot file, with an in-process fallback behind them.
pub async fn run() -> Result<(), BootstrapError> {
    let addresses: Vec<String> = std::env::args().skip(1).collect();
    run_with_addresses(addresses).await
}

async fn run_with_addresses(addresses: Vec<String>) -> Result<(), BootstrapError> {
    let config = SdkConfig::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("SPECIFY");
    let _telemetry = init_telemetry(&telemetry_config)?;

    let key = PublisherKey::parse(config.publisher_key())?;

    let mut builder = Specify::builder(key).base_url(config.base_url());
    if let Some(url) = config.cache_db_url() {
        builder = builder.session_store(Arc::new(SeaOrmSessionStore::new(url)));
    }
    if let Some(path) = config.cache_file() {
        builder = builder.session_store(Arc::new(JsonFileSessionStore::new(path)));
    }
    builder = builder.session_store(Arc::new(MemorySessionStore::new()));
    let client = builder.build();

    info!(addresses = addresses.len(), "resolving ad");

    let options = ServeOptions {
        image_format: config.image_format(),
        ad_unit_id: config.ad_unit_id().map(str::to_owned),
    };

    match client.serve(addresses, &options).await? {
        Some(ad) => {
            info!(
                campaign = %ad.campaign_id,
                format = ad.image_format.as_ref(),
                "ad resolved"
            );
            println!("{}", serde_json::to_string_pretty(&ad)?);
        }
        None => println!("no ad available for this session"),
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid publisher key: {0}")]
    Key(#[from] KeyFormatError),
    #[error(transparent)]
    Specify(#[from] SpecifyError),
    #[error("failed to render ad: {0}")]
    Render(#[from] serde_json::Error),
}
