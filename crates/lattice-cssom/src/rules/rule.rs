//! Rule kinds.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{RuleList, StyleDeclaration, StyleSheetId};
use crate::error::HierarchyReason;
use crate::media::MediaList;
use crate::parser::{CssParser, FailFast, InputSource};
use crate::selector::SelectorList;
use crate::{Error, Result};

static NEXT_RULE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity handle of a rule, used for parent-rule back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl RuleId {
    fn next() -> Self {
        Self(NEXT_RULE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A rule's identity and its non-owning back-references.
///
/// Links never take part in equality, hashing or persistence: two links
/// always compare equal, and decoding hands out a fresh identity.
#[derive(Debug, Clone)]
pub struct RuleLinks {
    id: RuleId,
    parent_style_sheet: Option<StyleSheetId>,
    parent_rule: Option<RuleId>,
}

impl RuleLinks {
    /// The rule's identity.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The stylesheet this rule belongs to.
    pub fn parent_style_sheet(&self) -> Option<StyleSheetId> {
        self.parent_style_sheet
    }

    /// The grouping rule this rule is nested in.
    pub fn parent_rule(&self) -> Option<RuleId> {
        self.parent_rule
    }
}

impl Default for RuleLinks {
    fn default() -> Self {
        Self {
            id: RuleId::next(),
            parent_style_sheet: None,
            parent_rule: None,
        }
    }
}

impl PartialEq for RuleLinks {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for RuleLinks {}

impl Hash for RuleLinks {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

/// CSSOM rule type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum RuleType {
    Unknown = 0,
    Style = 1,
    Charset = 2,
    Import = 3,
    Media = 4,
    FontFace = 5,
    Page = 6,
}

impl RuleType {
    /// The numeric CSSOM code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// `@charset` and `@import` are pinned to the head of a rule list.
    pub fn is_preamble(self) -> bool {
        matches!(self, Self::Charset | Self::Import)
    }
}

/// A CSS rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CssRule {
    Style(StyleRule),
    Charset(CharsetRule),
    Import(ImportRule),
    Media(MediaRule),
    FontFace(FontFaceRule),
    Page(PageRule),
    Unknown(UnknownRule),
}

impl CssRule {
    /// The rule's type code.
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Style(_) => RuleType::Style,
            Self::Charset(_) => RuleType::Charset,
            Self::Import(_) => RuleType::Import,
            Self::Media(_) => RuleType::Media,
            Self::FontFace(_) => RuleType::FontFace,
            Self::Page(_) => RuleType::Page,
            Self::Unknown(_) => RuleType::Unknown,
        }
    }

    /// Identity and back-references.
    pub fn links(&self) -> &RuleLinks {
        match self {
            Self::Style(r) => &r.links,
            Self::Charset(r) => &r.links,
            Self::Import(r) => &r.links,
            Self::Media(r) => &r.links,
            Self::FontFace(r) => &r.links,
            Self::Page(r) => &r.links,
            Self::Unknown(r) => &r.links,
        }
    }

    fn links_mut(&mut self) -> &mut RuleLinks {
        match self {
            Self::Style(r) => &mut r.links,
            Self::Charset(r) => &mut r.links,
            Self::Import(r) => &mut r.links,
            Self::Media(r) => &mut r.links,
            Self::FontFace(r) => &mut r.links,
            Self::Page(r) => &mut r.links,
            Self::Unknown(r) => &mut r.links,
        }
    }

    /// The rule's identity.
    pub fn id(&self) -> RuleId {
        self.links().id
    }

    /// The stylesheet this rule belongs to.
    pub fn parent_style_sheet(&self) -> Option<StyleSheetId> {
        self.links().parent_style_sheet
    }

    /// The grouping rule this rule is nested in.
    pub fn parent_rule(&self) -> Option<RuleId> {
        self.links().parent_rule
    }

    /// Point this rule, and everything nested in it, at a new owner.
    pub(crate) fn attach(&mut self, sheet: Option<StyleSheetId>, parent: Option<RuleId>) {
        let links = self.links_mut();
        links.parent_style_sheet = sheet;
        links.parent_rule = parent;
        if let Self::Media(media) = self {
            let id = media.links.id;
            media.rules.attach(sheet, Some(id));
        }
    }

    /// Canonical CSS text of the rule.
    pub fn css_text(&self) -> String {
        self.to_string()
    }

    /// The style rule, if this is one.
    pub fn as_style(&self) -> Option<&StyleRule> {
        match self {
            Self::Style(r) => Some(r),
            _ => None,
        }
    }

    /// The import rule, if this is one.
    pub fn as_import(&self) -> Option<&ImportRule> {
        match self {
            Self::Import(r) => Some(r),
            _ => None,
        }
    }

    /// The media rule, if this is one.
    pub fn as_media(&self) -> Option<&MediaRule> {
        match self {
            Self::Media(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn as_media_mut(&mut self) -> Option<&mut MediaRule> {
        match self {
            Self::Media(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style(r) => fmt::Display::fmt(r, f),
            Self::Charset(r) => fmt::Display::fmt(r, f),
            Self::Import(r) => fmt::Display::fmt(r, f),
            Self::Media(r) => fmt::Display::fmt(r, f),
            Self::FontFace(r) => fmt::Display::fmt(r, f),
            Self::Page(r) => fmt::Display::fmt(r, f),
            Self::Unknown(r) => fmt::Display::fmt(r, f),
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, style: &StyleDeclaration) -> fmt::Result {
    if style.is_empty() {
        write!(f, "{{ }}")
    } else {
        write!(f, "{{ {} }}", style)
    }
}

/// `selector { declarations }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRule {
    #[serde(skip)]
    links: RuleLinks,
    /// The selectors the block applies to.
    pub selectors: SelectorList,
    /// The declarations.
    pub style: StyleDeclaration,
}

impl StyleRule {
    /// Create a style rule.
    pub fn new(selectors: SelectorList, style: StyleDeclaration) -> Self {
        Self {
            links: RuleLinks::default(),
            selectors,
            style,
        }
    }

    /// The selector text.
    pub fn selector_text(&self) -> String {
        self.selectors.to_string()
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.selectors)?;
        write_block(f, &self.style)
    }
}

/// `@charset "encoding";`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharsetRule {
    #[serde(skip)]
    links: RuleLinks,
    /// The declared encoding.
    pub encoding: String,
}

impl CharsetRule {
    /// Create a charset rule.
    pub fn new(encoding: impl Into<String>) -> Self {
        Self {
            links: RuleLinks::default(),
            encoding: encoding.into(),
        }
    }
}

impl fmt::Display for CharsetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@charset \"{}\";", self.encoding)
    }
}

/// `@import url(href) media;`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRule {
    #[serde(skip)]
    links: RuleLinks,
    /// The imported location as written.
    pub href: String,
    /// Media the import is restricted to.
    pub media: MediaList,
}

impl ImportRule {
    /// Create an import rule.
    pub fn new(href: impl Into<String>, media: MediaList) -> Self {
        Self {
            links: RuleLinks::default(),
            href: href.into(),
            media,
        }
    }
}

impl fmt::Display for ImportRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@import url({})", self.href)?;
        if !self.media.is_empty() {
            write!(f, " {}", self.media)?;
        }
        write!(f, ";")
    }
}

/// `@media media { rules }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRule {
    #[serde(skip)]
    links: RuleLinks,
    /// Media the nested rules apply to.
    pub media: MediaList,
    rules: RuleList,
}

impl MediaRule {
    /// Create a media rule; the nested rules are re-parented to it.
    pub fn new(media: MediaList, rules: RuleList) -> Self {
        let mut rule = Self {
            links: RuleLinks::default(),
            media,
            rules,
        };
        let id = rule.links.id;
        rule.rules.attach(None, Some(id));
        rule
    }

    /// The nested rules.
    pub fn css_rules(&self) -> &RuleList {
        &self.rules
    }

    /// Parse `text` as a single rule and insert it at `index` of the nested list.
    ///
    /// `@charset` and `@import` are rejected; nested lists otherwise follow no
    /// ordering constraints.
    pub fn insert_rule(&mut self, text: &str, index: usize) -> Result<usize> {
        let sheet = self.links.parent_style_sheet;
        let mut parser = CssParser::new();
        if let Some(sheet) = sheet {
            parser = parser.with_parent_style_sheet(sheet);
        }
        let rule = parser
            .parse_rule(&InputSource::new(text), &mut FailFast)?
            .ok_or_else(|| Error::syntax(format!("Parsing rule '{}' failed.", text)))?;

        if index > self.rules.len() {
            return Err(Error::index_size(index, self.rules.len()));
        }
        if rule.rule_type().is_preamble() {
            return Err(Error::HierarchyRequest(HierarchyReason::NotAllowedInGroup));
        }

        self.rules.insert(rule, index)?;
        let id = self.links.id;
        if let Some(inserted) = self.rules.item_mut(index) {
            inserted.attach(sheet, Some(id));
        }
        Ok(index)
    }

    /// Remove the nested rule at `index`.
    pub fn delete_rule(&mut self, index: usize) -> Result<()> {
        self.rules.delete(index).map(|_| ())
    }

    pub(crate) fn set_css_rules(&mut self, rules: RuleList) {
        self.rules = rules;
        let (sheet, id) = (self.links.parent_style_sheet, self.links.id);
        self.rules.attach(sheet, Some(id));
    }
}

impl fmt::Display for MediaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.media.is_empty() {
            writeln!(f, "@media {{")?;
        } else {
            writeln!(f, "@media {} {{", self.media)?;
        }
        for rule in self.rules.iter() {
            for line in rule.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        write!(f, "}}")
    }
}

/// `@font-face { declarations }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFaceRule {
    #[serde(skip)]
    links: RuleLinks,
    /// The font descriptors.
    pub style: StyleDeclaration,
}

impl FontFaceRule {
    /// Create a font-face rule.
    pub fn new(style: StyleDeclaration) -> Self {
        Self {
            links: RuleLinks::default(),
            style,
        }
    }
}

impl fmt::Display for FontFaceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@font-face ")?;
        write_block(f, &self.style)
    }
}

/// `@page :first { declarations }`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRule {
    #[serde(skip)]
    links: RuleLinks,
    /// Page selector text such as `:first`, if any.
    pub selector: Option<String>,
    /// The page descriptors.
    pub style: StyleDeclaration,
}

impl PageRule {
    /// Create a page rule.
    pub fn new(selector: Option<String>, style: StyleDeclaration) -> Self {
        Self {
            links: RuleLinks::default(),
            selector,
            style,
        }
    }
}

impl fmt::Display for PageRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            Some(selector) => write!(f, "@page {} ", selector)?,
            None => write!(f, "@page ")?,
        }
        write_block(f, &self.style)
    }
}

/// An at-rule this object model does not interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnknownRule {
    #[serde(skip)]
    links: RuleLinks,
    /// The full source text of the rule.
    pub text: String,
}

impl UnknownRule {
    /// Create an unknown rule.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            links: RuleLinks::default(),
            text: text.into(),
        }
    }
}

impl fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
