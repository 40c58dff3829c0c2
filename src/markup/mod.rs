//! Block-markup parsing and validation.
//!
//! Raw strategy markup is parsed into an owned [`Element`] tree, checked for
//! parser-error markers and stamped with the compatibility flag the workspace
//! expects before it is ever handed to a workspace.

mod document;
mod validator;

pub use document::{Element, Node};
pub use validator::{NormalizedDocument, validate};

use thiserror::Error;

/// Attribute every loadable document root must carry.
pub const COMPATIBILITY_ATTRIBUTE: &str = "is_dbot";

/// Fixed value of [`COMPATIBILITY_ATTRIBUTE`].
pub const COMPATIBILITY_VALUE: &str = "true";

/// Element name browsers inject into a DOM when markup fails to parse.
pub const PARSER_ERROR_ELEMENT: &str = "parsererror";

/// Deepest element nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Reasons a markup document is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The text is not well-formed markup.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// No root element was found.
    #[error("document has no root element")]
    NoRootElement,

    /// More than one top-level element.
    #[error("document has more than one root element")]
    MultipleRoots,

    /// A parser-error marker element appears somewhere in the tree.
    #[error("document contains a <{PARSER_ERROR_ELEMENT}> marker")]
    ParserErrorMarker,

    /// Elements nest deeper than [`MAX_DEPTH`].
    #[error("document nests deeper than {0} elements")]
    NestingTooDeep(usize),

    /// The normalized tree could not be written back out.
    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl ValidationError {
    /// Create a new parse error.
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}
