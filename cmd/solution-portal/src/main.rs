//! # Solution Portal
//!
//! Terminal front-end that assembles the portal from settings: a catalog
//! backend, the local media loader with its preload cache, the navigation
//! controller and the viewer session.

mod app;
mod commands;
mod host;

use std::sync::Arc;

use anyhow::Context;
use configs::{LogSettings, Settings, StoreBackend};
use domains::CatalogStore;
use services::viewer::ViewerSession;
use services::{ImagePreloadCache, NavigationController, SolutionResolver};
use storage_adapters::{CatalogSeed, InMemoryCatalog, LocalImageLoader};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::app::App;
use crate::host::TerminalHost;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    // stdout belongs to the prompt.
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(feature = "db-postgres")]
async fn connect_postgres(settings: &Settings) -> anyhow::Result<Arc<dyn CatalogStore>> {
    use secrecy::ExposeSecret;

    let url = settings
        .store
        .database_url
        .as_ref()
        .context("store.database_url is required by the postgres backend")?;
    let store = storage_adapters::PgCatalogStore::connect(url.expose_secret(), settings.store.max_connections).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "db-postgres"))]
async fn connect_postgres(_: &Settings) -> anyhow::Result<Arc<dyn CatalogStore>> {
    anyhow::bail!("this build has no postgres support, rebuild with `--features db-postgres`")
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            let path = &settings.store.catalog_path;
            let seed = CatalogSeed::load(path)
                .await
                .with_context(|| format!("loading catalog {}", path.display()))?;
            Ok(Arc::new(InMemoryCatalog::from_seed(seed)))
        }
        StoreBackend::Postgres => connect_postgres(settings).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let faculty_id = settings.faculty_id()?;
    let viewer_id = settings.profile.viewer_id.unwrap_or_else(Uuid::new_v4);
    let store = open_store(&settings).await?;

    let loader = Arc::new(LocalImageLoader::new(&settings.media.root));
    let preload = ImagePreloadCache::new(loader.clone(), settings.media.fetch_timeout());
    let fetch_timeout = settings.navigation.fetch_timeout();
    let resolver = SolutionResolver::new(store.clone(), fetch_timeout).with_preload(preload);

    let host = Arc::new(TerminalHost::default());
    let app = App {
        nav: NavigationController::new(store, faculty_id, fetch_timeout),
        session: ViewerSession::new(resolver, host.clone(), viewer_id),
        host,
        loader,
    };

    info!(%faculty_id, %viewer_id, backend = ?settings.store.backend, "solution portal ready");
    app.run().await
}
