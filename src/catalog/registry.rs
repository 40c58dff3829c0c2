//! Immutable strategy registry.

use super::{Provenance, SourceDocument, StrategyRecord};
use crate::markup::{self, ValidationError};
use chrono::Utc;
use tracing::{debug, info, warn};

/// An id produced by more than one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    /// The colliding id.
    pub id: String,
    /// Source names producing it, in registry order. The first one wins lookups.
    pub sources: Vec<String>,
}

/// A record whose markup does not validate.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditFinding {
    /// Record id.
    pub id: String,
    /// Why the markup was rejected.
    pub error: ValidationError,
}

/// The fixed table of strategies available for loading.
///
/// Built once; there is no way to add, remove or edit a record afterwards.
#[derive(Debug)]
pub struct Registry {
    records: Vec<StrategyRecord>,
    duplicates: Vec<DuplicateId>,
}

impl Registry {
    /// Build a registry from source documents, keeping their order.
    ///
    /// Duplicate ids do not fail construction: they are collected into an
    /// integrity report and logged once.
    pub fn build(sources: impl IntoIterator<Item = SourceDocument>) -> Self {
        let created_at = Utc::now();
        let mut records: Vec<StrategyRecord> = Vec::new();

        info!("Building strategy catalog");

        for (index, source) in sources.into_iter().enumerate() {
            let id = source
                .derive_id()
                .unwrap_or_else(|| format!("strategy_{}", index + 1));
            debug!("Registering strategy '{}' from {}", id, source.source_name);

            records.push(StrategyRecord {
                name: source.display_name().to_string(),
                id,
                markup: source.markup,
                created_at,
                provenance: Provenance::Bundled,
                source: source.source_name,
            });
        }

        let duplicates = find_duplicates(&records);
        for dup in &duplicates {
            warn!(
                "Duplicate strategy id '{}' from sources {:?}; the first one wins",
                dup.id, dup.sources
            );
        }

        info!("Strategy catalog ready with {} entries", records.len());

        Self {
            records,
            duplicates,
        }
    }

    /// Look up a record. With duplicate ids the first registered one is returned.
    pub fn get(&self, id: &str) -> Option<&StrategyRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// All records in construction order.
    pub fn records(&self) -> &[StrategyRecord] {
        &self.records
    }

    /// All ids in construction order (duplicates included).
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Integrity report: ids produced by more than one source.
    pub fn duplicates(&self) -> &[DuplicateId] {
        &self.duplicates
    }

    /// Check whether an id is affected by a duplicate.
    pub fn is_duplicate(&self, id: &str) -> bool {
        self.duplicates.iter().any(|dup| dup.id == id)
    }

    /// Validate every record's markup without touching any workspace.
    pub fn audit(&self) -> Vec<AuditFinding> {
        self.records
            .iter()
            .filter_map(|record| {
                markup::validate(&record.markup)
                    .err()
                    .map(|error| AuditFinding {
                        id: record.id.clone(),
                        error,
                    })
            })
            .collect()
    }
}

fn find_duplicates(records: &[StrategyRecord]) -> Vec<DuplicateId> {
    let mut duplicates: Vec<DuplicateId> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if duplicates.iter().any(|dup| dup.id == record.id) {
            continue;
        }
        let sources: Vec<String> = records[index..]
            .iter()
            .filter(|other| other.id == record.id)
            .map(|other| other.source.clone())
            .collect();
        if sources.len() > 1 {
            duplicates.push(DuplicateId {
                id: record.id.clone(),
                sources,
            });
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources() -> Vec<SourceDocument> {
        vec![
            SourceDocument::new("alpha.xml", "<xml/>").with_id("alpha"),
            SourceDocument::new("beta.xml", "<xml><block type=\"b\"/></xml>").with_name("Beta"),
            SourceDocument::new("gamma.xml", "<broken"),
        ]
    }

    #[test]
    fn test_build_keeps_order_and_metadata() {
        let registry = Registry::build(sources());

        assert_eq!(registry.ids(), vec!["alpha", "beta", "gammaxml"]);
        let beta = registry.get("beta").unwrap();
        assert_eq!(beta.name, "Beta");
        assert_eq!(beta.source, "beta.xml");
        assert_eq!(beta.provenance, Provenance::Bundled);
        assert!(registry.duplicates().is_empty());
    }

    #[test]
    fn test_records_share_construction_timestamp() {
        let registry = Registry::build(sources());
        let first = registry.records()[0].created_at;
        assert!(registry.records().iter().all(|r| r.created_at == first));
    }

    #[test]
    fn test_duplicates_are_reported_and_first_wins() {
        let registry = Registry::build(vec![
            SourceDocument::new("one", "<xml n=\"1\"/>").with_name("Dup"),
            SourceDocument::new("two", "<xml/>").with_id("other"),
            SourceDocument::new("three", "<xml n=\"3\"/>").with_name("dup!"),
        ]);

        assert_eq!(
            registry.duplicates(),
            &[DuplicateId {
                id: "dup".into(),
                sources: vec!["one".into(), "three".into()],
            }]
        );
        assert!(registry.is_duplicate("dup"));
        assert!(!registry.is_duplicate("other"));
        assert_eq!(registry.get("dup").unwrap().source, "one");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unnamed_sources_get_positional_ids() {
        let registry = Registry::build(vec![SourceDocument::new("***", "<xml/>")]);
        assert_eq!(registry.ids(), vec!["strategy_1"]);
    }

    #[test]
    fn test_audit_reports_broken_markup() {
        let registry = Registry::build(sources());
        let findings = registry.audit();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "gammaxml");
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::build(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }
}
