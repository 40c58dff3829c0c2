//! Markup validation and normalization.

use super::{COMPATIBILITY_ATTRIBUTE, COMPATIBILITY_VALUE, Element, PARSER_ERROR_ELEMENT, ValidationError};

/// A parsed, validated document with the compatibility flag applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    root: Element,
}

impl NormalizedDocument {
    /// Root element of the document.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Top-level block elements, in document order.
    pub fn top_blocks(&self) -> impl Iterator<Item = &Element> {
        self.root
            .child_elements()
            .filter(|el| el.name() == "block")
    }

    /// Total number of blocks, nested ones included.
    pub fn block_count(&self) -> usize {
        self.root.count_descendants("block")
    }

    /// Serialize the normalized document.
    pub fn to_markup(&self) -> Result<String, ValidationError> {
        self.root.to_markup()
    }
}

/// Parse and normalize raw strategy markup.
///
/// The input is never modified; normalization happens on a parsed copy, so
/// validating the same text repeatedly always yields the same document.
pub fn validate(raw: &str) -> Result<NormalizedDocument, ValidationError> {
    let mut root = Element::parse(raw)?;

    if root.find_descendant(PARSER_ERROR_ELEMENT).is_some() {
        return Err(ValidationError::ParserErrorMarker);
    }

    root.set_attribute(COMPATIBILITY_ATTRIBUTE, COMPATIBILITY_VALUE);
    Ok(NormalizedDocument { root })
}
