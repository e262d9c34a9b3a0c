use crate::config::AppConfig;
use crate::groups::GroupService;
use crate::resolver::AddressResolver;
use crate::storage::{ContactStore, RosterStorage, TrustStore};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Process-wide handles shared by every add-contact screen.
pub struct AppState {
    config: AppConfig,
    storage: RosterStorage,
}

impl AppState {
    pub fn open(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let path = config.storage_path();
        let storage = RosterStorage::open(&path)
            .with_context(|| format!("failed to open roster storage at {:?}", path))?;
        info!(path = %path.display(), "roster storage opened");
        Ok(Arc::new(Self { config, storage }))
    }

    /// State backed by a throwaway database.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let storage = RosterStorage::temporary()?;
        Ok(Arc::new(Self { config, storage }))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn contacts(&self) -> anyhow::Result<ContactStore> {
        self.storage.contacts()
    }

    pub fn trust(&self) -> anyhow::Result<TrustStore> {
        self.storage.trust()
    }

    pub fn resolver(&self, groups: Arc<dyn GroupService>) -> anyhow::Result<AddressResolver> {
        Ok(AddressResolver::new(self.contacts()?, groups))
    }
}
