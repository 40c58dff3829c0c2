//! Read-only catalog surface for selection lists.

use super::{Registry, StrategyRecord};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Listing operations over the registry.
///
/// `save` and `remove` exist so callers written against a persistent catalog
/// keep compiling; they always fail because the catalog is fixed.
#[derive(Debug, Clone)]
pub struct Catalog {
    registry: Arc<Registry>,
}

impl Catalog {
    /// Wrap a registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Every strategy, in registry order.
    pub fn list_all(&self) -> &[StrategyRecord] {
        let records = self.registry.records();
        debug!(
            "Available strategies: {:?}",
            records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()
        );
        records
    }

    /// Every id, in registry order.
    pub fn ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Look up a single strategy.
    pub fn get(&self, id: &str) -> Option<&StrategyRecord> {
        self.registry.get(id)
    }

    /// Persisting workspaces is disabled.
    pub fn save(&self, _name: &str, _markup: &str) -> Result<()> {
        warn!("Saving disabled, only bundled strategies are available");
        Err(Error::CatalogImmutable("save"))
    }

    /// Removing strategies is disabled.
    pub fn remove(&self, id: &str) -> Result<()> {
        warn!("Remove of '{}' disabled, only bundled strategies are available", id);
        Err(Error::CatalogImmutable("remove"))
    }
}
