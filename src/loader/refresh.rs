//! Deferred resize-and-redraw after a load.

use crate::error::{Error, Result};
use crate::workspace::{Workspace, WorkspaceHost};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Handle to a scheduled refresh.
///
/// Dropping the handle detaches the task; it still fires.
#[derive(Debug)]
pub struct RefreshHandle {
    strategy_id: String,
    task: JoinHandle<Result<()>>,
}

impl RefreshHandle {
    /// Schedule a refresh of the host's workspace after `delay`.
    pub fn schedule<W>(host: WorkspaceHost<W>, strategy_id: impl Into<String>, delay: Duration) -> Self
    where
        W: Workspace + 'static,
    {
        let strategy_id = strategy_id.into();
        let expected = strategy_id.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = refresh(&host, &expected).await;
            if let Err(e) = &result {
                error!("Deferred refresh for '{}' failed: {}", expected, e);
            }
            result
        });

        Self { strategy_id, task }
    }

    /// Strategy this refresh was scheduled for.
    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    /// Cancel the refresh if it has not fired yet.
    pub fn cancel(&self) {
        debug!("Cancelling pending refresh for '{}'", self.strategy_id);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the refresh to complete.
    pub async fn wait(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(Error::render(e.to_string())),
        }
    }
}

async fn refresh<W: Workspace>(host: &WorkspaceHost<W>, expected_id: &str) -> Result<()> {
    let mut slot = host.lock().await;
    let Some(workspace) = slot.as_mut() else {
        warn!("Workspace gone before refresh of '{}'", expected_id);
        return Ok(());
    };

    let current = workspace.current_strategy_id();
    if current.as_deref() != Some(expected_id) {
        warn!(
            "Refreshing workspace for '{}' but it now shows {:?}",
            expected_id, current
        );
    }

    workspace
        .svg_resize()
        .and_then(|_| workspace.render())
        .map_err(|e| Error::render(e.to_string()))
}
