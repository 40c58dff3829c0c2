//! botdeck - load bundled trading strategies into a block workspace.
//!
//! Lists the bundled catalog or loads one strategy into a headless workspace
//! and reports what ended up on it.

use botdeck::catalog::{self, Catalog};
use botdeck::storage::{self, DisabledStorage};
use botdeck::{Config, Error, InMemoryWorkspace, Result, StrategyLoader, WorkspaceHost, logging};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "botdeck", version, about = "Strategy catalog and workspace loader")]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List bundled strategies and exit.
    #[arg(short, long)]
    list: bool,

    /// Print the listing as JSON.
    #[arg(long, requires = "list")]
    json: bool,

    /// Write the default configuration file and exit.
    #[arg(long)]
    init_config: bool,

    /// Strategy id to load (defaults to the configured or first strategy).
    strategy: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;

    // Initialize logging
    let _log_guard = logging::init(&config.logging)?;

    if cli.init_config {
        let path = Config::default().save(cli.config)?;
        info!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    storage::clear_persisted_strategies(&DisabledStorage).await?;

    let catalog = Catalog::new(catalog::bundled::registry());
    for finding in catalog.registry().audit() {
        warn!("Bundled strategy '{}' is broken: {}", finding.id, finding.error);
    }

    if cli.list {
        return print_listing(&catalog, cli.json);
    }

    let Some(id) = cli
        .strategy
        .or_else(|| config.loader.default_strategy.clone())
        .or_else(|| catalog.ids().into_iter().next())
    else {
        return Err(Error::application("No strategies available"));
    };

    let host = WorkspaceHost::with_workspace(InMemoryWorkspace::new());
    let mut loader = StrategyLoader::new(catalog.registry().clone(), host.clone(), config.loader);

    let report = match loader.try_load(&id).await {
        Ok(report) => report,
        Err(e) => {
            error!("Could not load '{}': {}", id, e);
            return Err(e);
        }
    };

    if let Some(refresh) = loader.take_pending_refresh() {
        if !refresh.is_finished() {
            debug!("Waiting for workspace refresh of '{}'", refresh.strategy_id());
        }
        refresh.wait().await?;
    }

    let summary = host
        .with(|ws| (ws.blocks().len(), ws.variables().len(), ws.render_count()))
        .await;
    if let Some((top_blocks, variables, renders)) = summary {
        println!(
            "{} ({}): {} blocks, {} top-level, {} variables, rendered {} time(s)",
            report.name, report.id, report.blocks, top_blocks, variables, renders
        );
    }

    Ok(())
}

fn print_listing(catalog: &Catalog, json: bool) -> Result<()> {
    let records = catalog.list_all();

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    for record in records {
        println!("{:<28} {} [{}]", record.id, record.name, record.provenance);
    }
    Ok(())
}
