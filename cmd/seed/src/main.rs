//! Loads a JSON catalog into Postgres.
//!
//! ```text
//! PORTAL__STORE__DATABASE_URL=postgres://... seed [catalog.json]
//! ```
//!
//! Without an argument the file named by `store.catalog_path` is imported.
//! Records are upserted by id, so the seed can be re-run after editing the file.

use std::path::PathBuf;

use anyhow::Context;
use configs::Settings;
use secrecy::ExposeSecret;
use storage_adapters::{CatalogSeed, PgCatalogStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.level)))
        .init();

    let url = settings
        .store
        .database_url
        .as_ref()
        .context("set PORTAL__STORE__DATABASE_URL")?;
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.store.catalog_path.clone());

    let seed = CatalogSeed::load(&path)
        .await
        .with_context(|| format!("loading catalog {}", path.display()))?;
    let store = PgCatalogStore::connect(url.expose_secret(), settings.store.max_connections).await?;
    store.migrate().await?;
    store.import(&seed).await?;

    info!(path = %path.display(), faculties = seed.faculties.len(), "seed finished");
    Ok(())
}
