//! Selector type definitions.

use std::fmt;

use cssparser::serialize_identifier;
use serde::{Deserialize, Serialize};

use super::Condition;

/// A comma-separated group of selectors (e.g., "h1, h2.title").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectorList {
    /// The selectors in source order.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Create a list from selectors.
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    /// Number of selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Iterate over selectors.
    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A complete CSS selector (e.g., "ul.nav > li:first-child a").
///
/// A selector consists of one or more simple selectors connected by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SelectorParts")]
pub struct Selector {
    /// Chain of simple selectors, leftmost first.
    pub parts: Vec<SimpleSelector>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a selector from a single simple selector.
    pub fn simple(part: SimpleSelector) -> Self {
        Self {
            parts: vec![part],
            combinators: vec![],
        }
    }

    /// Create an element selector.
    pub fn element(name: impl Into<String>) -> Self {
        Self::simple(SimpleSelector::element(name))
    }

    /// Create a universal selector (*).
    pub fn universal() -> Self {
        Self::simple(SimpleSelector::universal())
    }

    /// Append a part joined by `combinator`.
    pub fn combine(mut self, combinator: Combinator, part: SimpleSelector) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(combinator);
        }
        self.parts.push(part);
        self
    }

    /// Get the rightmost (subject) simple selector.
    pub fn subject(&self) -> Option<&SimpleSelector> {
        self.parts.last()
    }
}

/// Unchecked stored form of a [`Selector`].
#[derive(Deserialize)]
struct SelectorParts {
    parts: Vec<SimpleSelector>,
    combinators: Vec<Combinator>,
}

impl TryFrom<SelectorParts> for Selector {
    type Error = String;

    fn try_from(raw: SelectorParts) -> Result<Self, Self::Error> {
        if raw.parts.is_empty() || raw.combinators.len() != raw.parts.len() - 1 {
            return Err(format!(
                "selector with {} parts cannot have {} combinators",
                raw.parts.len(),
                raw.combinators.len()
            ));
        }
        Ok(Self {
            parts: raw.parts,
            combinators: raw.combinators,
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.parts.iter();
        if let Some(first) = parts.next() {
            write!(f, "{}", first)?;
        }
        // A missing combinator renders as descendant.
        let mut combinators = self.combinators.iter();
        for part in parts {
            let combinator = combinators.next().copied().unwrap_or(Combinator::Descendant);
            write!(f, "{}{}", combinator, part)?;
        }
        Ok(())
    }
}

/// A compound selector segment (e.g., "a.external[href]::after").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SimpleSelector {
    /// Element name, `*` for an explicit universal selector. `None` is an
    /// implied universal selector, as in `.note`.
    pub element: Option<String>,
    /// Conditions on the element, chained with [`Condition::and`].
    pub condition: Option<Condition>,
    /// Pseudo-element name without the leading colons.
    pub pseudo_element: Option<String>,
}

impl SimpleSelector {
    /// Create an element-only selector.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            element: Some(name.into()),
            ..Default::default()
        }
    }

    /// Create an explicit universal selector part.
    pub fn universal() -> Self {
        Self::element("*")
    }

    /// Add a condition, and-ing it with any existing one.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.add_condition(condition);
        self
    }

    /// Add a condition in place.
    pub fn add_condition(&mut self, condition: Condition) {
        self.condition = Some(match self.condition.take() {
            Some(existing) => Condition::and(existing, condition),
            None => condition,
        });
    }

    /// Set the pseudo-element.
    pub fn with_pseudo_element(mut self, name: impl Into<String>) -> Self {
        self.pseudo_element = Some(name.into());
        self
    }

    /// Check whether nothing has been set on this part.
    pub fn is_empty(&self) -> bool {
        self.element.is_none() && self.condition.is_none() && self.pseudo_element.is_none()
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(name) if name == "*" => write!(f, "*")?,
            Some(name) => serialize_identifier(name, f)?,
            None if self.condition.is_none() && self.pseudo_element.is_none() => write!(f, "*")?,
            None => {}
        }
        if let Some(condition) = &self.condition {
            write!(f, "{}", condition)?;
        }
        if let Some(pseudo) = &self.pseudo_element {
            write!(f, "::{}", pseudo)?;
        }
        Ok(())
    }
}

/// Selector combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    /// Descendant combinator (space): A B
    Descendant,
    /// Child combinator: A > B
    Child,
    /// Adjacent sibling combinator: A + B
    AdjacentSibling,
    /// General sibling combinator: A ~ B
    GeneralSibling,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descendant => write!(f, " "),
            Self::Child => write!(f, " > "),
            Self::AdjacentSibling => write!(f, " + "),
            Self::GeneralSibling => write!(f, " ~ "),
        }
    }
}
