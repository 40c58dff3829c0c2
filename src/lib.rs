//! # botdeck - Strategy Catalog & Workspace Loader
//!
//! The catalog and loading core of a block-based trading bot builder. A fixed
//! set of strategy documents is exposed for selection, and a chosen strategy
//! replaces the content of a live block workspace in one step.
//!
//! ## Architecture
//!
//! - **Catalog**: immutable registry of strategy records and the listing surface
//! - **Markup**: parsing, validation and normalization of block markup
//! - **Workspace**: capability trait for the editor, reset protocol, event suppression
//! - **Loader**: the load state machine and the deferred refresh
//! - **Storage**: persistence capability, disabled in this build
//! - **Config**: configuration management

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod markup;
pub mod storage;
pub mod workspace;

pub use catalog::{Catalog, Registry, StrategyRecord};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::{LoadReport, StrategyLoader};
pub use workspace::{InMemoryWorkspace, Workspace, WorkspaceHost};
