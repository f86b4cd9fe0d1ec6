use std::sync::Arc;

use anyhow::Context;

use crate::backend::MemoryBackend;
use crate::config::AppConfig;
use crate::portfolio::PortfolioStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PortfolioStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = PortfolioStore::connect(&config)
            .await
            .context("initialise portfolio store")?;
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: PortfolioStore, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// State over a fresh in-memory backend.
    pub fn fake() -> Self {
        Self::from_parts(
            PortfolioStore::new(Arc::new(MemoryBackend::new())),
            Arc::new(AppConfig::memory()),
        )
    }

    #[cfg(test)]
    pub fn offline() -> Self {
        use crate::backend::testing::UnreachableBackend;

        Self::from_parts(
            PortfolioStore::new(Arc::new(UnreachableBackend)),
            Arc::new(AppConfig::memory()),
        )
    }
}
