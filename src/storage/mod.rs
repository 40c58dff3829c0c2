//! Persistence capability.
//!
//! Saving strategies is switched off in this build. The interface stays so a
//! real backend can be plugged in without touching the loader; the only
//! implementation today is [`DisabledStorage`].

use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// Key holding user-saved workspaces.
pub const SAVED_WORKSPACES_KEY: &str = "saved_workspaces";

/// Key holding the recently opened strategies list.
pub const RECENT_STRATEGIES_KEY: &str = "recent_strategies";

/// Key-value persistence backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Storage that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStorage;

#[async_trait]
impl Storage for DisabledStorage {
    async fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_item(&self, key: &str, _value: String) -> Result<()> {
        debug!("Persistence disabled, dropping write to '{}'", key);
        Ok(())
    }

    async fn remove_item(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Remove the saved and recent strategy entries left by earlier builds.
pub async fn clear_persisted_strategies(storage: &dyn Storage) -> Result<()> {
    storage.remove_item(SAVED_WORKSPACES_KEY).await?;
    storage.remove_item(RECENT_STRATEGIES_KEY).await?;
    info!("Cleared saved/recent strategies, bundled strategies only");
    Ok(())
}
