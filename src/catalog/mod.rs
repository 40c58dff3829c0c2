//! Strategy catalog.
//!
//! A fixed, ordered table of strategy records built once at startup from
//! bundled markup documents, plus the read-only surface used by selection
//! lists.

pub mod bundled;
mod query;
mod record;
mod registry;

pub use query::Catalog;
pub use record::{Provenance, SourceDocument, StrategyRecord, normalize_id};
pub use registry::{AuditFinding, DuplicateId, Registry};
