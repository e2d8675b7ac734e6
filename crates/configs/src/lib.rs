//! # Settings
//!
//! Layered configuration for the portal binaries. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional, not committed)
//! 4. environment variables `PORTAL__SECTION__KEY`, after `.env` is loaded
//!
//! `PORTAL__STORE__DATABASE_URL=postgres://...` sets `store.database_url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, Map};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub const ENV_PREFIX: &str = "PORTAL";
pub const DEFAULT_CONFIG_DIR: &str = "config";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub profile: ProfileSettings,
    pub store: StoreSettings,
    pub media: MediaSettings,
    pub navigation: NavigationSettings,
    pub log: LogSettings,
}

/// The signed-in student. Their faculty is fixed and scopes the whole catalog.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileSettings {
    pub faculty_id: Option<Uuid>,
    /// Recorded on consultations; a fresh id is used per run when unset.
    pub viewer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// JSON catalog loaded by the memory backend
    pub catalog_path: PathBuf,
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct MediaSettings {
    pub root: PathBuf,
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct NavigationSettings {
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub json: bool,
}

impl MediaSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl NavigationSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Settings {
    /// Loads `.env`, then every layer from [`DEFAULT_CONFIG_DIR`] and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "ignoring unreadable .env"),
        }
        Self::from_layers(Path::new(DEFAULT_CONFIG_DIR), None)
    }

    /// Builds settings from the files in `dir`. `env` replaces the process
    /// environment when given.
    pub fn from_layers(dir: &Path, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("store.backend", "memory")?
            .set_default("store.catalog_path", "demos/catalog.json")?
            .set_default("store.max_connections", 5)?
            .set_default("media.root", "demos/media")?
            .set_default("media.fetch_timeout_ms", 5_000)?
            .set_default("navigation.fetch_timeout_ms", 10_000)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join("local").to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The configured faculty; required by every front-end.
    pub fn faculty_id(&self) -> Result<Uuid, ConfigError> {
        self.profile
            .faculty_id
            .ok_or_else(|| ConfigError::invalid("profile.faculty_id", "not set"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::invalid(
                "store.database_url",
                "required by the postgres backend",
            ));
        }
        if self.store.max_connections == 0 {
            return Err(ConfigError::invalid("store.max_connections", "must be at least 1"));
        }
        if self.media.fetch_timeout_ms == 0 {
            return Err(ConfigError::invalid("media.fetch_timeout_ms", "must be positive"));
        }
        if self.navigation.fetch_timeout_ms == 0 {
            return Err(ConfigError::invalid("navigation.fetch_timeout_ms", "must be positive"));
        }
        Ok(())
    }
}
