use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::database::models::{TOKENS, USERS};
use crate::database::{FileStore, KeyLocks, StoreError};
use crate::middleware::{Authorizer, OpenAccess, TokenOwnership};

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: FileStore,
    pub locks: Arc<KeyLocks>,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let store = FileStore::new(config.storage.data_dir.clone());

        let authorizer: Arc<dyn Authorizer> = if config.security.enforce_ownership {
            info!("Ownership checks enabled: protected routes require a token header");
            Arc::new(TokenOwnership::new(store.clone()))
        } else {
            Arc::new(OpenAccess)
        };

        Self {
            config: Arc::new(config),
            store,
            locks: Arc::new(KeyLocks::new()),
            authorizer,
        }
    }

    /// Create the record directories for every resource type
    pub async fn prepare_storage(&self) -> Result<(), StoreError> {
        self.store.ensure_resources(&[USERS, TOKENS]).await
    }

    pub fn hashing_secret(&self) -> &str {
        &self.config.security.hashing_secret
    }
}
