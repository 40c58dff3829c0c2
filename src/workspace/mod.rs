//! Workspace collaborator.
//!
//! The visual editor is owned elsewhere; the loader only sees the narrow
//! [`Workspace`] capability set through a shared [`WorkspaceHost`].

mod events;
mod memory;
mod reset;

pub use events::SuppressedEvents;
pub use memory::{Block, InMemoryWorkspace, WorkspaceEvent};
pub use reset::reset;

use crate::markup::NormalizedDocument;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

/// Errors raised by a workspace implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// A block element is missing required data.
    #[error("malformed block: {0}")]
    MalformedBlock(String),

    /// A variable id or name is already bound.
    #[error("variable '{0}' is already defined")]
    VariableConflict(String),

    /// The editor backend failed.
    #[error("workspace backend failure: {0}")]
    Backend(String),
}

impl WorkspaceError {
    /// Create a new backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Capabilities the loader needs from a live workspace.
#[cfg_attr(test, mockall::automock)]
pub trait Workspace: Send {
    /// Remove every block.
    fn clear(&mut self) -> Result<(), WorkspaceError>;

    /// Drop undo and redo history.
    fn clear_undo(&mut self);

    /// Drop all variable bindings.
    fn clear_variables(&mut self);

    /// Insert the blocks and variables of a document.
    ///
    /// Failures must come back as `Err`. A panic here unwinds past the
    /// loader's rollback, and release builds abort on panic.
    fn load_document(&mut self, document: &NormalizedDocument) -> Result<(), WorkspaceError>;

    /// Id of the strategy currently shown, if any.
    fn current_strategy_id(&self) -> Option<String>;

    fn set_current_strategy_id(&mut self, id: Option<String>);

    /// Stop emitting change events.
    fn disable_events(&mut self);

    /// Resume emitting change events.
    fn enable_events(&mut self);

    /// Recompute the drawing surface size. Headless workspaces may ignore it.
    fn svg_resize(&mut self) -> Result<(), WorkspaceError> {
        Ok(())
    }

    /// Redraw every block. Headless workspaces may ignore it.
    fn render(&mut self) -> Result<(), WorkspaceError> {
        Ok(())
    }
}

/// Shared slot holding the live workspace, if one has been created.
///
/// The host never creates a workspace itself; the editor installs one once
/// it is ready.
pub struct WorkspaceHost<W> {
    inner: Arc<Mutex<Option<W>>>,
}

impl<W> Clone for WorkspaceHost<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> Default for WorkspaceHost<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> WorkspaceHost<W> {
    /// An empty host, waiting for a workspace.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// A host with a workspace already installed.
    pub fn with_workspace(workspace: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(workspace))),
        }
    }

    /// Install (or replace) the live workspace.
    pub async fn install(&self, workspace: W) {
        *self.inner.lock().await = Some(workspace);
    }

    /// Remove the live workspace, returning it.
    pub async fn take(&self) -> Option<W> {
        self.inner.lock().await.take()
    }

    /// Whether a workspace is installed.
    pub async fn is_ready(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    /// Lock the slot for exclusive use.
    pub async fn lock(&self) -> MutexGuard<'_, Option<W>> {
        self.inner.lock().await
    }

    /// Run a closure against the installed workspace.
    pub async fn with<R>(&self, f: impl FnOnce(&mut W) -> R) -> Option<R> {
        self.inner.lock().await.as_mut().map(f)
    }
}
