use std::sync::Arc;

use store::{Store, StoreError};

use super::{auth::Tokens, config::Config, database::init_database};

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub tokens: Tokens,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = init_database(&config).await?;

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Store) -> Arc<Self> {
        let tokens = Tokens::new(&config.jwt);

        Arc::new(Self {
            config,
            store,
            tokens,
        })
    }
}
