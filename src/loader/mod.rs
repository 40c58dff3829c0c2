//! Strategy loader.
//!
//! Replaces the content of the live workspace with a catalog entry:
//! lookup, then reset, validate and insert with change events suppressed, then a
//! deferred redraw. Every failure is caught here and reported as `false`
//! from [`StrategyLoader::load`]; [`StrategyLoader::try_load`] keeps the
//! detail for callers that want it.

mod refresh;
mod state;

pub use refresh::RefreshHandle;
pub use state::LoadState;

use crate::catalog::Registry;
use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::markup::{self, NormalizedDocument};
use crate::workspace::{SuppressedEvents, Workspace, WorkspaceHost, reset};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Id now stamped on the workspace.
    pub id: String,
    /// Display name of the loaded strategy.
    pub name: String,
    /// Number of blocks inserted, nested ones included.
    pub blocks: usize,
}

/// Loads catalog entries into a shared workspace.
///
/// `load` takes `&mut self`, so one loader never runs two loads at once.
/// Separate loaders on the same host are not coordinated.
pub struct StrategyLoader<W> {
    registry: Arc<Registry>,
    host: WorkspaceHost<W>,
    config: LoaderConfig,
    state: LoadState,
    pending_refresh: Option<RefreshHandle>,
}

impl<W: Workspace + 'static> StrategyLoader<W> {
    /// Create a loader over a registry and a workspace host.
    pub fn new(registry: Arc<Registry>, host: WorkspaceHost<W>, config: LoaderConfig) -> Self {
        Self {
            registry,
            host,
            config,
            state: LoadState::Idle,
            pending_refresh: None,
        }
    }

    /// Current phase.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The workspace host this loader drives.
    pub fn host(&self) -> &WorkspaceHost<W> {
        &self.host
    }

    /// Take the handle of the most recently scheduled refresh.
    pub fn take_pending_refresh(&mut self) -> Option<RefreshHandle> {
        self.pending_refresh.take()
    }

    /// Load a strategy, returning whether the workspace now shows it.
    pub async fn load(&mut self, id: &str) -> bool {
        match self.try_load(id).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Load of '{}' aborted: {}", id, e);
                false
            }
        }
    }

    /// Load a strategy, returning the failure reason on error.
    pub async fn try_load(&mut self, id: &str) -> Result<LoadReport> {
        debug!("Attempting to load strategy: {}", id);
        self.transition(LoadState::Resolving);

        let registry = Arc::clone(&self.registry);
        let Some(record) = registry.get(id) else {
            let available = registry.ids();
            error!(
                "Strategy with id \"{}\" not found. Available strategies: {:?}",
                id, available
            );
            return self.abort(Error::lookup(id, available));
        };
        if registry.is_duplicate(id) {
            warn!(
                "Strategy id '{}' is registered more than once; using {}",
                id, record.source
            );
        }

        let host = self.host.clone();
        let mut slot = host.lock().await;
        let Some(workspace) = slot.as_mut() else {
            error!("Workspace not initialized");
            return self.abort(Error::precondition("workspace not initialized"));
        };

        self.transition(LoadState::Resetting);
        #[allow(clippy::collapsible_if)] // Intentionally avoiding let-chains for stable Rust
        if self.config.cancel_stale_refresh {
            if let Some(stale) = self.pending_refresh.take() {
                stale.cancel();
            }
        }
        let replaced = {
            let mut suppressed = SuppressedEvents::new(&mut *workspace);
            self.replace_content(&mut *suppressed, id, &record.markup)
        };
        let document = match replaced {
            Ok(document) => document,
            Err(e) => return self.abort(e),
        };
        drop(slot);

        self.transition(LoadState::Refreshing);
        self.pending_refresh = Some(RefreshHandle::schedule(
            host,
            id,
            self.config.refresh_delay(),
        ));

        info!("Loaded strategy: {} (ID: {})", record.name, id);
        self.transition(LoadState::Idle);

        Ok(LoadReport {
            id: id.to_string(),
            name: record.name.clone(),
            blocks: document.block_count(),
        })
    }

    /// Reset, validate and insert with events already suppressed by the caller.
    ///
    /// Observers see nothing of the swap, and a failed insertion is cleared
    /// again before events come back on.
    fn replace_content(&mut self, workspace: &mut W, id: &str, raw: &str) -> Result<NormalizedDocument> {
        if let Err(e) = reset(workspace) {
            error!("Failed to reset workspace: {}", e);
            return Err(e.into());
        }

        let document = match markup::validate(raw) {
            Ok(document) => document,
            Err(e) => {
                error!("Invalid markup for strategy {}: {}", id, e);
                return Err(e.into());
            }
        };

        self.transition(LoadState::SuppressedLoad);
        if let Err(e) = workspace.load_document(&document) {
            error!("Error loading strategy {}: {}", id, e);
            // Never leave a half-inserted document behind.
            if let Err(cleanup) = reset(workspace) {
                error!("Failed to clear partially loaded workspace: {}", cleanup);
            }
            return Err(e.into());
        }
        workspace.set_current_strategy_id(Some(id.to_string()));

        Ok(document)
    }

    fn transition(&mut self, next: LoadState) {
        if !self.state.can_transition_to(next) {
            warn!("Unexpected loader transition {} -> {}", self.state, next);
        }
        debug!("Loader {} -> {}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, err: Error) -> Result<LoadReport> {
        self.transition(LoadState::Aborted);
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceDocument;
    use crate::workspace::{InMemoryWorkspace, MockWorkspace, WorkspaceError, WorkspaceEvent};
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    const ALPHA: &str = r#"<xml>
        <variables><variable id="stake">Stake</variable></variables>
        <block type="trade_definition" id="a1"><next><block type="purchase" id="a2"/></next></block>
        <block type="after_purchase" id="a3"/>
    </xml>"#;
    const BETA: &str = r#"<xml>
        <variables><variable id="stake">Stake</variable></variables>
        <block type="before_purchase" id="b1"/>
    </xml>"#;

    fn config() -> LoaderConfig {
        LoaderConfig {
            refresh_delay_ms: 1,
            ..LoaderConfig::default()
        }
    }

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::build(vec![
            SourceDocument::new("alpha.xml", ALPHA).with_id("alpha"),
            SourceDocument::new("beta.xml", BETA).with_id("beta"),
            SourceDocument::new("broken.xml", "<not valid xml").with_id("broken"),
            SourceDocument::new("untyped.xml", r#"<xml><block type="a" id="ghost"/><block/></xml>"#)
                .with_id("untyped"),
        ]))
    }

    fn loader() -> StrategyLoader<InMemoryWorkspace> {
        StrategyLoader::new(
            registry(),
            WorkspaceHost::with_workspace(InMemoryWorkspace::new()),
            config(),
        )
    }

    async fn snapshot(loader: &StrategyLoader<InMemoryWorkspace>) -> (Option<String>, Vec<String>) {
        loader
            .host()
            .with(|ws| {
                (
                    ws.current_strategy_id(),
                    ws.blocks().iter().map(|b| b.id.clone()).collect(),
                )
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_switching_strategies_leaves_no_residue() {
        let mut loader = loader();

        assert!(loader.load("alpha").await);
        assert_eq!(
            snapshot(&loader).await,
            (Some("alpha".into()), vec!["a1".into(), "a3".into()])
        );

        assert!(loader.load("beta").await);
        assert_eq!(snapshot(&loader).await, (Some("beta".into()), vec!["b1".into()]));
        assert_eq!(loader.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_try_load_reports_details() {
        let mut loader = loader();
        let report = assert_ok!(loader.try_load("alpha").await);
        assert_eq!(
            report,
            LoadReport {
                id: "alpha".into(),
                name: "alpha.xml".into(),
                blocks: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_markup_leaves_workspace_empty() {
        let mut loader = loader();
        assert!(loader.load("alpha").await);

        assert!(!loader.load("broken").await);
        let (_, blocks) = snapshot(&loader).await;
        assert!(blocks.is_empty());
        assert_eq!(loader.state(), LoadState::Aborted);

        assert!(matches!(
            loader.try_load("broken").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_insertion_is_rolled_back() {
        let mut workspace = InMemoryWorkspace::new();
        let mut rx = workspace.subscribe();
        let mut loader = StrategyLoader::new(
            registry(),
            WorkspaceHost::with_workspace(workspace),
            config(),
        );

        let err = assert_err!(loader.try_load("untyped").await);
        assert!(matches!(err, Error::Workspace(WorkspaceError::MalformedBlock(_))));

        let (current, blocks) = snapshot(&loader).await;
        assert!(blocks.is_empty());
        assert_eq!(current, None);

        let (enabled, undo) = loader
            .host()
            .with(|ws| (ws.events_enabled(), ws.undo_depth()))
            .await
            .unwrap();
        assert!(enabled);
        assert_eq!(undo, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_switch_leaves_no_undo_history_or_events() {
        let mut workspace = InMemoryWorkspace::new();
        let mut rx = workspace.subscribe();
        let mut loader = StrategyLoader::new(
            registry(),
            WorkspaceHost::with_workspace(workspace),
            config(),
        );

        assert!(loader.load("alpha").await);
        assert!(loader.load("beta").await);

        let (undo, variables) = loader
            .host()
            .with(|ws| (ws.undo_depth(), ws.variables().len()))
            .await
            .unwrap();
        assert_eq!(undo, 0);
        assert_eq!(variables, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_id_touches_nothing() {
        let mut ws = MockWorkspace::new();
        ws.expect_clear().never();
        ws.expect_clear_undo().never();
        ws.expect_clear_variables().never();
        ws.expect_load_document().never();
        ws.expect_disable_events().never();
        ws.expect_set_current_strategy_id().never();

        let mut loader = StrategyLoader::new(registry(), WorkspaceHost::with_workspace(ws), config());

        assert!(!loader.load("does-not-exist").await);
        assert!(matches!(
            loader.try_load("does-not-exist").await,
            Err(Error::Lookup { .. })
        ));
        assert!(loader.take_pending_refresh().is_none());
    }

    #[tokio::test]
    async fn test_missing_workspace_is_a_precondition_failure() {
        let host: WorkspaceHost<InMemoryWorkspace> = WorkspaceHost::new();
        let mut loader = StrategyLoader::new(registry(), host.clone(), config());

        assert!(matches!(
            loader.try_load("alpha").await,
            Err(Error::Precondition(_))
        ));

        host.install(InMemoryWorkspace::new()).await;
        assert!(loader.load("alpha").await);
    }

    #[tokio::test]
    async fn test_events_reenabled_once_when_insertion_fails() {
        let mut ws = MockWorkspace::new();
        ws.expect_clear().returning(|| Ok(()));
        ws.expect_clear_undo().return_const(());
        ws.expect_clear_variables().return_const(());
        ws.expect_disable_events().times(1).return_const(());
        ws.expect_load_document()
            .times(1)
            .returning(|_| Err(WorkspaceError::backend("renderer crashed")));
        ws.expect_enable_events().times(1).return_const(());
        ws.expect_set_current_strategy_id().never();

        let mut loader = StrategyLoader::new(registry(), WorkspaceHost::with_workspace(ws), config());

        assert!(!loader.load("alpha").await);
    }

    #[tokio::test]
    async fn test_no_change_events_during_insertion() {
        let mut workspace = InMemoryWorkspace::new();
        let mut rx = workspace.subscribe();
        let mut loader = StrategyLoader::new(
            registry(),
            WorkspaceHost::with_workspace(workspace),
            config(),
        );

        assert!(loader.load("alpha").await);
        assert!(loader.load("beta").await);

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen, Vec::<WorkspaceEvent>::new());
    }

    #[tokio::test]
    async fn test_refresh_redraws_after_load() {
        let mut loader = loader();
        assert!(loader.load("alpha").await);

        let refresh = loader.take_pending_refresh().unwrap();
        assert_eq!(refresh.strategy_id(), "alpha");
        assert_ok!(refresh.wait().await);

        let counts = loader
            .host()
            .with(|ws| (ws.resize_count(), ws.render_count()))
            .await
            .unwrap();
        assert_eq!(counts, (1, 1));
    }

    #[tokio::test]
    async fn test_render_failure_does_not_fail_load() {
        let mut ws = MockWorkspace::new();
        ws.expect_clear().returning(|| Ok(()));
        ws.expect_clear_undo().return_const(());
        ws.expect_clear_variables().return_const(());
        ws.expect_disable_events().return_const(());
        ws.expect_enable_events().return_const(());
        ws.expect_load_document().returning(|_| Ok(()));
        ws.expect_set_current_strategy_id().return_const(());
        ws.expect_current_strategy_id()
            .returning(|| Some("alpha".to_string()));
        ws.expect_svg_resize().returning(|| Ok(()));
        ws.expect_render()
            .returning(|| Err(WorkspaceError::backend("no canvas")));

        let mut loader = StrategyLoader::new(registry(), WorkspaceHost::with_workspace(ws), config());

        assert!(loader.load("alpha").await);
        let refresh = loader.take_pending_refresh().unwrap();
        assert!(matches!(refresh.wait().await, Err(Error::Render(_))));
    }

    #[tokio::test]
    async fn test_stale_refresh_cancelled_when_configured() {
        let mut loader = StrategyLoader::new(
            registry(),
            WorkspaceHost::with_workspace(InMemoryWorkspace::new()),
            LoaderConfig {
                refresh_delay_ms: 60_000,
                cancel_stale_refresh: true,
                ..LoaderConfig::default()
            },
        );

        assert!(loader.load("alpha").await);
        assert!(loader.load("beta").await);

        let refresh = loader.take_pending_refresh().unwrap();
        assert_eq!(refresh.strategy_id(), "beta");
        refresh.cancel();
        assert_ok!(refresh.wait().await);

        let renders = loader.host().with(|ws| ws.render_count()).await.unwrap();
        assert_eq!(renders, 0);
    }

    #[tokio::test]
    async fn test_duplicate_id_loads_first_registered() {
        let registry = Arc::new(Registry::build(vec![
            SourceDocument::new("first", r#"<xml><block type="a" id="first"/></xml>"#).with_name("Dup"),
            SourceDocument::new("second", r#"<xml><block type="b" id="second"/></xml>"#)
                .with_name("dup"),
        ]));
        assert_eq!(registry.duplicates().len(), 1);

        let mut loader = StrategyLoader::new(
            registry,
            WorkspaceHost::with_workspace(InMemoryWorkspace::new()),
            config(),
        );

        assert!(loader.load("dup").await);
        assert_eq!(snapshot(&loader).await, (Some("dup".into()), vec!["first".into()]));
    }

    #[tokio::test]
    async fn test_listing_unchanged_by_loads() {
        let mut loader = loader();
        let before = loader.registry.ids();
        loader.load("alpha").await;
        loader.load("broken").await;
        loader.load("missing").await;
        assert_eq!(loader.registry.ids(), before);
    }
}
