//! sweepdb-ingest - one-shot catalog synchronization
//!
//! Reads configuration from `SWEEPDB_CONFIG` / the user config directory and
//! the environment, opens the catalog, syncs the data root once and exits.

use anyhow::{Context, Result};
use sweepdb_common::config::IngestConfig;
use sweepdb_ingest::CatalogSynchronizer;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let config = IngestConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sweepdb-ingest {}", env!("CARGO_PKG_VERSION"));
    info!("Data root: {}", config.data_root.display());
    info!("Catalog: {}", config.database_path.display());
    info!("Host: {} ({})", config.host.host_name, config.host.base_url);

    let pool = sweepdb_common::db::init_catalog(&config.database_path)
        .await
        .context("Failed to open catalog")?;

    let report = CatalogSynchronizer::new(pool.clone())
        .run(&config.data_root, &config.host)
        .await
        .context("Catalog sync failed")?;

    for skipped in &report.skipped {
        warn!("Skipped {}: {}", skipped.relative_path, skipped.reason);
    }
    info!(
        "Sync complete: {} container(s), {} export(s), {} measurement(s), {} skipped",
        report.containers.total(),
        report.exports.total(),
        report.measurements_upserted,
        report.skipped.len()
    );

    pool.close().await;
    Ok(())
}
