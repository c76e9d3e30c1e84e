//! # SQLite
//!
//! Single relational store for every entity.
//!
//! ## Requirements
//!
//! - One transaction per request, committed once at the end of the handler
//! - Referential integrity enforced by the engine, not by handlers
//! - Exact money, decimal(18,2) stored as integer hundredths
//!
//! ## Implementation
//!
//! - `sqlx` pool, file created on first start
//! - Schema applied by the embedded migrations on every start, already applied
//!   migrations are skipped
//! - `sqlite::memory:` gets a single long lived connection, so tests share one database
use store::{Store, StoreError};
use tracing::info;

use crate::config::Config;

pub async fn init_database(config: &Config) -> Result<Store, StoreError> {
    info!("Connecting to database...");
    let store = Store::connect(&config.database_url, config.max_connections).await?;

    info!("Applying migrations...");
    store.migrate().await?;

    Ok(store)
}
