//! Ordered rule collections.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CssRule, RuleId, RuleType, StyleSheetId};
use crate::error::HierarchyReason;
use crate::{Error, Result};

/// An ordered list of rules, owned by a stylesheet or a grouping rule.
///
/// Indices are 0-based and contiguous. Raw insertion only checks bounds;
/// placement rules are checked by [`RuleList::check_placement`], which the
/// stylesheet mutators run before inserting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleList {
    rules: Vec<CssRule>,
}

impl RuleList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get the rule at `index`.
    pub fn item(&self, index: usize) -> Option<&CssRule> {
        self.rules.get(index)
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut CssRule> {
        self.rules.get_mut(index)
    }

    /// Iterate over rules.
    pub fn iter(&self) -> std::slice::Iter<'_, CssRule> {
        self.rules.iter()
    }

    /// The rules as a slice.
    pub fn as_slice(&self) -> &[CssRule] {
        &self.rules
    }

    /// Append a rule without any checks.
    pub fn push(&mut self, rule: CssRule) {
        self.rules.push(rule);
    }

    /// Insert `rule` at `index`, shifting later rules up.
    pub fn insert(&mut self, rule: CssRule, index: usize) -> Result<()> {
        if index > self.rules.len() {
            return Err(Error::index_size(index, self.rules.len()));
        }
        self.rules.insert(index, rule);
        Ok(())
    }

    /// Remove the rule at `index`, shifting later rules down.
    pub fn delete(&mut self, index: usize) -> Result<CssRule> {
        if index >= self.rules.len() {
            return Err(Error::index_size(index, self.rules.len()));
        }
        Ok(self.rules.remove(index))
    }

    /// Swap the rule at `index` for `rule`, returning the old one.
    pub(crate) fn replace(&mut self, index: usize, rule: CssRule) -> Result<CssRule> {
        match self.rules.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, rule)),
            None => Err(Error::index_size(index, self.rules.len())),
        }
    }

    /// Check whether a rule of `rule_type` may be inserted at `index`.
    ///
    /// `@charset` may only sit at index 0 and only once; `@import` may only be
    /// preceded by `@charset` or other imports; nothing may be placed in front
    /// of an existing `@charset` or `@import` unless it is one of those too.
    pub fn check_placement(
        &self,
        rule_type: RuleType,
        index: usize,
    ) -> std::result::Result<(), HierarchyReason> {
        if self.rules.is_empty() {
            return Ok(());
        }
        let type_at = |i: usize| self.rules[i].rule_type();

        match rule_type {
            RuleType::Charset => {
                if index != 0 {
                    return Err(HierarchyReason::CharsetNotFirst);
                }
                if type_at(0) == RuleType::Charset {
                    return Err(HierarchyReason::CharsetNotUnique);
                }
            }
            RuleType::Import => {
                if index == 0 && type_at(0) == RuleType::Charset {
                    return Err(HierarchyReason::InsertBeforeCharset);
                }
                let end = index.min(self.rules.len());
                if (0..end).any(|i| !type_at(i).is_preamble()) {
                    return Err(HierarchyReason::ImportNotFirst);
                }
            }
            _ => {
                if (index..self.rules.len()).any(|i| type_at(i).is_preamble()) {
                    return Err(HierarchyReason::InsertBeforeImport);
                }
            }
        }
        Ok(())
    }

    /// Point every rule at a new owner.
    pub(crate) fn attach(&mut self, sheet: Option<StyleSheetId>, parent: Option<RuleId>) {
        for rule in &mut self.rules {
            rule.attach(sheet, parent);
        }
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a CssRule;
    type IntoIter = std::slice::Iter<'a, CssRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<CssRule> for RuleList {
    fn from_iter<I: IntoIterator<Item = CssRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RuleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
