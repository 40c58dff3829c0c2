//! Error types for botdeck.

use crate::markup::ValidationError;
use crate::workspace::WorkspaceError;
use thiserror::Error;

/// The main error type for botdeck.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (config files, log directories, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested strategy id is not in the catalog
    #[error("Strategy '{id}' not found. Available strategies: {}", .available.join(", "))]
    Lookup {
        /// The id that was requested.
        id: String,
        /// Every id the catalog does know about, in catalog order.
        available: Vec<String>,
    },

    /// The workspace collaborator is missing or not initialized
    #[error("Workspace unavailable: {0}")]
    Precondition(String),

    /// Strategy markup failed to parse
    #[error("Invalid markup: {0}")]
    Validation(#[from] ValidationError),

    /// The workspace collaborator rejected an operation
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Deferred resize/render failed
    #[error("Render error: {0}")]
    Render(String),

    /// Attempt to persist or delete a catalog entry
    #[error("Catalog is read-only: {0} is disabled")]
    CatalogImmutable(&'static str),

    /// Persistence backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic application error
    #[error("{0}")]
    Application(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new lookup error.
    pub fn lookup(id: impl Into<String>, available: Vec<String>) -> Self {
        Self::Lookup {
            id: id.into(),
            available,
        }
    }

    /// Create a new precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a new render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a new storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new application error.
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }

    /// Check if this error is recoverable (caller can retry or pick another strategy).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Lookup { .. } | Self::Precondition(_) | Self::Validation(_) | Self::Render(_)
        )
    }
}
