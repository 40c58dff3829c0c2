//! Strategy records and the source documents they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Shipped with the application.
    Bundled,
    /// Previously saved by a user. Never populated while persistence is disabled.
    UserSaved,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundled => write!(f, "bundled"),
            Self::UserSaved => write!(f, "user saved"),
        }
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyRecord {
    /// Normalized, unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Raw block markup, exactly as delivered.
    #[serde(skip_serializing)]
    pub markup: String,
    /// When the registry holding this record was built.
    pub created_at: DateTime<Utc>,
    /// Origin of the record.
    pub provenance: Provenance,
    /// Name of the source document.
    pub source: String,
}

/// Raw input for one catalog entry.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Source document name, e.g. the bundled file stem.
    pub source_name: String,
    /// Explicit id, if the document declares one.
    pub id: Option<String>,
    /// Explicit display name.
    pub name: Option<String>,
    /// Raw markup text.
    pub markup: String,
}

impl SourceDocument {
    /// Create a source document with no explicit id or name.
    pub fn new(source_name: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            id: None,
            name: None,
            markup: markup.into(),
        }
    }

    /// Set an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name: the explicit name, else the source name.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source_name)
    }

    /// Derive the normalized id, preferring the explicit id, then the display
    /// name, then the source name.
    pub fn derive_id(&self) -> Option<String> {
        [self.id.as_deref(), self.name.as_deref(), Some(self.source_name.as_str())]
            .into_iter()
            .flatten()
            .map(normalize_id)
            .find(|id| !id.is_empty())
    }
}

/// Normalize a display string into an identifier.
///
/// Letters and digits are lower-cased and kept, whitespace, `-` and `_` fold
/// into a single `_`, anything else is dropped. Leading and trailing
/// separators are trimmed.
pub fn normalize_id(raw: &str) -> String {
    let mut id = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !id.is_empty() {
                id.push('_');
            }
            pending_separator = false;
            id.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
    }

    id
}
