//! CSS Object Model for Lattice.
//!
//! This crate parses CSS into an editable object model, featuring:
//!
//! - **Conditions and selectors**: attribute, class, id, `:lang()` and
//!   pseudo-class conditions that render back to canonical CSS
//! - **Rules**: style, `@charset`, `@import`, `@media`, `@font-face`, `@page`
//!   and unknown at-rules, held in ordered rule lists
//! - **Stylesheets**: rule insertion and deletion with CSS ordering checks
//!   and a read-only gate
//! - **Import inlining**: `@import` rules replaced by media-scoped groups
//! - **Persistence**: stylesheets stored and restored as JSON
//!
//! # Example
//!
//! ```ignore
//! use lattice_cssom::prelude::*;
//!
//! let mut sheet = StyleSheet::from_css("@charset \"UTF-8\"; p { color: red }");
//! sheet.insert_rule("h1 { font-weight: bold }", 2)?;
//! println!("{}", sheet);
//! ```

pub mod codec;
pub mod import;
pub mod media;
pub mod parser;
pub mod rules;
pub mod selector;

mod error;

pub use error::{Error, HierarchyReason, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::codec::{decode, encode};
    pub use crate::import::{FetchError, Fetcher, FileFetcher, ImportResolver};
    pub use crate::media::MediaList;
    pub use crate::parser::{
        CollectingErrorHandler, CssParser, ErrorHandler, FailFast, InputSource,
        LoggingErrorHandler, ParseError, parse_css,
    };
    pub use crate::rules::{
        CssRule, MediaRule, Property, RuleList, RuleType, StyleDeclaration, StyleRule, StyleSheet,
    };
    pub use crate::selector::{Combinator, Condition, ConditionType, Selector, SelectorList};
    pub use crate::{Error, HierarchyReason, Result};
}
