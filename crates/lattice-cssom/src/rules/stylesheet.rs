//! The stylesheet root object.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{MediaRule, RuleId, RuleList};
use crate::media::MediaList;
use crate::parser::{CssParser, FailFast, InputSource, LoggingErrorHandler};
use crate::{Error, Result};

static NEXT_SHEET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity handle of a stylesheet, used for back-references from rules and
/// child sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleSheetId(u64);

impl StyleSheetId {
    fn next() -> Self {
        Self(NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle to the document node that owns a stylesheet
/// (a `<style>` or `<link>` element). The object model never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// A CSS stylesheet.
///
/// The sheet owns its rule list. `owner_node`, `parent_style_sheet` and
/// `owner_rule` are plain handles; they never take part in equality, hashing
/// or persistence.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    id: StyleSheetId,
    disabled: bool,
    owner_node: Option<NodeHandle>,
    parent_style_sheet: Option<StyleSheetId>,
    href: Option<String>,
    title: Option<String>,
    media: MediaList,
    owner_rule: Option<RuleId>,
    read_only: bool,
    css_rules: RuleList,
    base_uri: Option<String>,
}

impl StyleSheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self {
            id: StyleSheetId::next(),
            disabled: false,
            owner_node: None,
            parent_style_sheet: None,
            href: None,
            title: None,
            media: MediaList::new(),
            owner_rule: None,
            read_only: false,
            css_rules: RuleList::new(),
            base_uri: None,
        }
    }

    /// Parse a stylesheet from CSS text, logging and skipping malformed parts.
    pub fn from_css(css: &str) -> Self {
        crate::parser::parse_css(css)
    }

    /// This sheet's identity handle.
    pub fn id(&self) -> StyleSheetId {
        self.id
    }

    /// Always `"text/css"`.
    pub fn sheet_type(&self) -> &'static str {
        "text/css"
    }

    /// Whether the sheet is disabled.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable the sheet. Reacting to the flag is left to the
    /// embedding document.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// The owning document node.
    pub fn owner_node(&self) -> Option<NodeHandle> {
        self.owner_node
    }

    /// Set the owning document node.
    pub fn set_owner_node(&mut self, node: Option<NodeHandle>) {
        self.owner_node = node;
    }

    /// The stylesheet that imported this one.
    pub fn parent_style_sheet(&self) -> Option<StyleSheetId> {
        self.parent_style_sheet
    }

    /// Set the parent stylesheet.
    pub fn set_parent_style_sheet(&mut self, parent: Option<StyleSheetId>) {
        self.parent_style_sheet = parent;
    }

    /// Location the sheet was loaded from.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Set the sheet location.
    pub fn set_href(&mut self, href: Option<String>) {
        self.href = href;
    }

    /// Advisory title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the advisory title.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    /// Media the sheet applies to.
    pub fn media(&self) -> &MediaList {
        &self.media
    }

    /// Replace the media list.
    pub fn set_media(&mut self, media: MediaList) {
        self.media = media;
    }

    /// Re-parse the media list from text.
    ///
    /// Parsing is best-effort: malformed queries are logged and dropped.
    pub fn set_media_text(&mut self, text: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::NoModificationAllowed);
        }
        match CssParser::new().parse_media(&InputSource::new(text), &mut LoggingErrorHandler) {
            Ok(media) => self.media = media,
            Err(e) => tracing::warn!("Failed to parse media text '{}': {}", text, e),
        }
        Ok(())
    }

    /// The `@import` rule this sheet was loaded for.
    pub fn owner_rule(&self) -> Option<RuleId> {
        self.owner_rule
    }

    /// Set the owning import rule.
    pub fn set_owner_rule(&mut self, rule: Option<RuleId>) {
        self.owner_rule = rule;
    }

    /// Whether rule mutation is blocked.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Block or allow rule mutation.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Base URI relative `@import` hrefs resolve against.
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Set the base URI.
    pub fn set_base_uri(&mut self, base_uri: Option<String>) {
        self.base_uri = base_uri;
    }

    /// The top-level rules.
    pub fn css_rules(&self) -> &RuleList {
        &self.css_rules
    }

    /// Replace the rule list wholesale.
    ///
    /// No placement checks are made; the caller is responsible for rule
    /// ordering. Back-references of every rule are re-pointed at this sheet.
    pub fn set_css_rules(&mut self, mut rules: RuleList) {
        rules.attach(Some(self.id), None);
        self.css_rules = rules;
    }

    pub(crate) fn css_rules_mut(&mut self) -> &mut RuleList {
        &mut self.css_rules
    }

    /// Parse `text` as a single rule and insert it at `index`.
    ///
    /// Returns `index` on success.
    ///
    /// # Errors
    ///
    /// - [`Error::NoModificationAllowed`] if the sheet is read-only
    /// - [`Error::Syntax`] if `text` is not exactly one valid rule
    /// - [`Error::IndexSize`] if `index` is greater than the rule count
    /// - [`Error::HierarchyRequest`] if the rule may not go at `index`
    pub fn insert_rule(&mut self, text: &str, index: usize) -> Result<usize> {
        if self.read_only {
            return Err(Error::NoModificationAllowed);
        }

        let mut rule = CssParser::new()
            .with_parent_style_sheet(self.id)
            .parse_rule(&InputSource::new(text), &mut FailFast)?
            .ok_or_else(|| Error::syntax(format!("Parsing rule '{}' failed.", text)))?;

        if index > self.css_rules.len() {
            return Err(Error::index_size(index, self.css_rules.len()));
        }
        self.css_rules
            .check_placement(rule.rule_type(), index)
            .map_err(Error::HierarchyRequest)?;

        rule.attach(Some(self.id), None);
        self.css_rules.insert(rule, index)?;
        Ok(index)
    }

    /// Remove the rule at `index`.
    pub fn delete_rule(&mut self, index: usize) -> Result<()> {
        if self.read_only {
            return Err(Error::NoModificationAllowed);
        }
        self.css_rules.delete(index).map(|_| ())
    }

    /// Mutable access to a top-level `@media` rule, for editing its nested list.
    ///
    /// Returns `Ok(None)` if the rule at `index` is not a media rule.
    pub fn media_rule_mut(&mut self, index: usize) -> Result<Option<&mut MediaRule>> {
        if self.read_only {
            return Err(Error::NoModificationAllowed);
        }
        let len = self.css_rules.len();
        let rule = self
            .css_rules
            .item_mut(index)
            .ok_or_else(|| Error::index_size(index, len))?;
        Ok(rule.as_media_mut())
    }

    /// A hash over the wider identity of the sheet: everything equality
    /// looks at plus `base_uri` and `read_only`.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.base_uri.hash(&mut hasher);
        self.css_rules.hash(&mut hasher);
        self.disabled.hash(&mut hasher);
        self.href.hash(&mut hasher);
        self.media.hash(&mut hasher);
        self.read_only.hash(&mut hasher);
        self.title.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

// owner_node and parent_style_sheet stay out of equality and hashing:
// following them could loop back into this sheet.
impl PartialEq for StyleSheet {
    fn eq(&self, other: &Self) -> bool {
        self.css_rules == other.css_rules
            && self.disabled == other.disabled
            && self.href == other.href
            && self.media == other.media
            && self.title == other.title
    }
}

impl Eq for StyleSheet {}

impl Hash for StyleSheet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.css_rules.hash(state);
        self.disabled.hash(state);
        self.href.hash(state);
        self.media.hash(state);
        self.title.hash(state);
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.css_rules, f)
    }
}
