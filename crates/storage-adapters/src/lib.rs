//! Adapters behind the `domains` ports.
//!
//! - [`memory::InMemoryCatalog`]: dashmap-backed catalog, seeded from JSON.
//! - [`local_images::LocalImageLoader`]: reads scanned pages from a media root.
//! - `postgres::PgCatalogStore`: sqlx catalog, behind `db-postgres`.

pub mod local_images;
pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use local_images::{CachedImage, LocalImageLoader};
pub use memory::{CatalogSeed, InMemoryCatalog};
#[cfg(feature = "db-postgres")]
pub use postgres::PgCatalogStore;
