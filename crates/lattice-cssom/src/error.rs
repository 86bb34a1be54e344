//! Error types for the object model.

use std::fmt;

/// Result type alias for CSSOM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by stylesheet mutation, import resolution and persistence.
///
/// These mirror the DOM exception codes a CSSOM mutator can raise. All of
/// them are recoverable at the call site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stylesheet (or rule) is read-only.
    #[error("This style sheet is read only")]
    NoModificationAllowed,

    /// Malformed rule, selector or media text, or an unresolvable import href.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// A rule index outside `0..=length` (insertion) or `0..length` (deletion).
    #[error("Index {index} is out of bounds for a rule list of length {length}")]
    IndexSize { index: usize, length: usize },

    /// Inserting the rule at the requested position would break rule ordering.
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(HierarchyReason),

    /// Encoding or decoding a persisted stylesheet failed.
    #[error("Stylesheet codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl Error {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create an index error.
    pub fn index_size(index: usize, length: usize) -> Self {
        Self::IndexSize { index, length }
    }

    /// The hierarchy sub-reason, if this is a hierarchy error.
    pub fn hierarchy_reason(&self) -> Option<HierarchyReason> {
        match self {
            Self::HierarchyRequest(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<crate::parser::ParseError> for Error {
    fn from(err: crate::parser::ParseError) -> Self {
        Self::syntax(err.to_string())
    }
}

/// Why a rule may not be inserted at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyReason {
    /// `@charset` inserted anywhere but index 0.
    CharsetNotFirst,
    /// A second `@charset` rule.
    CharsetNotUnique,
    /// `@import` preceded by something other than `@charset` or `@import`.
    ImportNotFirst,
    /// A regular rule placed in front of an `@import` or `@charset`.
    InsertBeforeImport,
    /// Any rule placed in front of the leading `@charset`.
    InsertBeforeCharset,
    /// `@charset` or `@import` inside a grouping rule.
    NotAllowedInGroup,
}

impl fmt::Display for HierarchyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::CharsetNotFirst => "@charset rule must be the first rule",
            Self::CharsetNotUnique => "only one @charset rule is allowed",
            Self::ImportNotFirst => "@import rules must precede all other rules",
            Self::InsertBeforeImport => "cannot insert a rule before an @import rule",
            Self::InsertBeforeCharset => "cannot insert a rule before the @charset rule",
            Self::NotAllowedInGroup => "@charset and @import are not allowed inside a grouping rule",
        };
        f.write_str(msg)
    }
}
