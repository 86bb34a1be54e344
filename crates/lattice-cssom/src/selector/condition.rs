//! Atomic selector conditions.

use std::fmt;
use std::hash::{Hash, Hasher};

use cssparser::{serialize_identifier, serialize_string};
use serde::{Deserialize, Serialize};

use crate::parser::Locator;

/// The kind of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    /// `[name]`
    Exists,
    /// `[name="value"]`
    Equals,
    /// `[name~="value"]`
    OneOf,
    /// `[name|="value"]`
    BeginHyphen,
    /// `[name^="value"]`
    Prefix,
    /// `[name$="value"]`
    Suffix,
    /// `[name*="value"]`
    Substring,
    /// `.value`
    Class,
    /// `#value`
    Id,
    /// `:lang(value)`
    Lang,
    /// `:name`
    PseudoClass,
    /// Two conditions that must both hold.
    And,
}

/// The predicate carried by a [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    Exists { name: String },
    Equals { name: String, value: Option<String> },
    OneOf { name: String, value: Option<String> },
    BeginHyphen { name: String, value: Option<String> },
    Prefix { name: String, value: Option<String> },
    Suffix { name: String, value: Option<String> },
    Substring { name: String, value: Option<String> },
    Class { value: Option<String> },
    Id { value: Option<String> },
    Lang { value: Option<String> },
    PseudoClass { value: Option<String> },
    And { left: Box<Condition>, right: Box<Condition> },
}

/// A single selector predicate, e.g. `.primary` or `[href$=".pdf"]`.
///
/// Conditions are immutable. Equality and hashing look at the predicate only;
/// the source location is informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    kind: ConditionKind,
    #[serde(skip)]
    locator: Option<Locator>,
}

impl Condition {
    fn from_kind(kind: ConditionKind) -> Self {
        Self { kind, locator: None }
    }

    /// `[name]`
    pub fn exists(name: impl Into<String>) -> Self {
        Self::from_kind(ConditionKind::Exists { name: name.into() })
    }

    /// `[name="value"]`
    pub fn equals(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Equals {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `[name~="value"]`, a whitespace-separated token match.
    pub fn one_of(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::OneOf {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `[name|="value"]`
    pub fn begin_hyphen(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::BeginHyphen {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `[name^="value"]`
    pub fn prefix(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Prefix {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `[name$="value"]`
    pub fn suffix(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Suffix {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `[name*="value"]`
    pub fn substring(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Substring {
            name: name.into(),
            value: value.map(Into::into),
        })
    }

    /// `.value`
    pub fn class(value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Class {
            value: value.map(Into::into),
        })
    }

    /// `#value`
    pub fn id(value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Id {
            value: value.map(Into::into),
        })
    }

    /// `:lang(value)`
    pub fn lang(value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::Lang {
            value: value.map(Into::into),
        })
    }

    /// `:value`. Functional pseudo-classes keep their argument text, e.g.
    /// `nth-child(2n+1)`.
    pub fn pseudo_class(value: Option<impl Into<String>>) -> Self {
        Self::from_kind(ConditionKind::PseudoClass {
            value: value.map(Into::into),
        })
    }

    /// Both `left` and `right`.
    pub fn and(left: Condition, right: Condition) -> Self {
        Self::from_kind(ConditionKind::And {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Attach the location this condition was parsed at.
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// The predicate.
    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// The kind tag.
    pub fn condition_type(&self) -> ConditionType {
        match &self.kind {
            ConditionKind::Exists { .. } => ConditionType::Exists,
            ConditionKind::Equals { .. } => ConditionType::Equals,
            ConditionKind::OneOf { .. } => ConditionType::OneOf,
            ConditionKind::BeginHyphen { .. } => ConditionType::BeginHyphen,
            ConditionKind::Prefix { .. } => ConditionType::Prefix,
            ConditionKind::Suffix { .. } => ConditionType::Suffix,
            ConditionKind::Substring { .. } => ConditionType::Substring,
            ConditionKind::Class { .. } => ConditionType::Class,
            ConditionKind::Id { .. } => ConditionType::Id,
            ConditionKind::Lang { .. } => ConditionType::Lang,
            ConditionKind::PseudoClass { .. } => ConditionType::PseudoClass,
            ConditionKind::And { .. } => ConditionType::And,
        }
    }

    /// The attribute name for attribute conditions.
    pub fn local_name(&self) -> Option<&str> {
        match &self.kind {
            ConditionKind::Exists { name }
            | ConditionKind::Equals { name, .. }
            | ConditionKind::OneOf { name, .. }
            | ConditionKind::BeginHyphen { name, .. }
            | ConditionKind::Prefix { name, .. }
            | ConditionKind::Suffix { name, .. }
            | ConditionKind::Substring { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The compared value, class name, id, language or pseudo-class name.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ConditionKind::Equals { value, .. }
            | ConditionKind::OneOf { value, .. }
            | ConditionKind::BeginHyphen { value, .. }
            | ConditionKind::Prefix { value, .. }
            | ConditionKind::Suffix { value, .. }
            | ConditionKind::Substring { value, .. }
            | ConditionKind::Class { value }
            | ConditionKind::Id { value }
            | ConditionKind::Lang { value }
            | ConditionKind::PseudoClass { value } => value.as_deref(),
            ConditionKind::Exists { .. } | ConditionKind::And { .. } => None,
        }
    }

    /// Where this condition was parsed, if it came from source text.
    pub fn locator(&self) -> Option<Locator> {
        self.locator
    }

    /// Canonical selector text for this condition.
    pub fn css_text(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

fn write_attribute(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    operator: &str,
    value: &Option<String>,
) -> fmt::Result {
    write!(f, "[")?;
    serialize_identifier(name, f)?;
    if let Some(value) = value {
        write!(f, "{}", operator)?;
        serialize_string(value, f)?;
    }
    write!(f, "]")
}

fn write_prefixed(
    f: &mut fmt::Formatter<'_>,
    prefix: char,
    value: &Option<String>,
) -> fmt::Result {
    write!(f, "{}", prefix)?;
    serialize_identifier(value.as_deref().unwrap_or(""), f)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConditionKind::Exists { name } => write_attribute(f, name, "", &None),
            ConditionKind::Equals { name, value } => write_attribute(f, name, "=", value),
            ConditionKind::OneOf { name, value } => write_attribute(f, name, "~=", value),
            ConditionKind::BeginHyphen { name, value } => write_attribute(f, name, "|=", value),
            ConditionKind::Prefix { name, value } => write_attribute(f, name, "^=", value),
            ConditionKind::Suffix { name, value } => write_attribute(f, name, "$=", value),
            ConditionKind::Substring { name, value } => write_attribute(f, name, "*=", value),
            ConditionKind::Class { value } => write_prefixed(f, '.', value),
            ConditionKind::Id { value } => write_prefixed(f, '#', value),
            ConditionKind::Lang { value } => write!(f, ":lang({})", value.as_deref().unwrap_or("")),
            ConditionKind::PseudoClass { value } => write!(f, ":{}", value.as_deref().unwrap_or("")),
            ConditionKind::And { left, right } => write!(f, "{}{}", left, right),
        }
    }
}
