//! Declaration blocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single `name: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    /// Property name, lowercased unless it is a custom property.
    pub name: String,
    /// Value text as written, trimmed, without `!important`.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

impl Property {
    /// Create a property.
    pub fn new(name: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            important,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            write!(f, " !important")?;
        }
        Ok(())
    }
}

/// An ordered declaration block, the body of a style, `@font-face` or
/// `@page` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleDeclaration {
    properties: Vec<Property>,
}

impl StyleDeclaration {
    /// Create an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Get the declaration at `index`.
    pub fn item(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    /// Iterate over declarations.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Look up a property by name. The last declaration wins.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().rev().find(|p| p.name == name)
    }

    /// The value of `name`, if declared.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name).map(|p| p.value.as_str())
    }

    /// `"important"` if `name` is declared important.
    pub fn property_priority(&self, name: &str) -> Option<&'static str> {
        self.property(name).filter(|p| p.important).map(|_| "important")
    }

    /// Set a property, replacing the effective declaration in place.
    pub fn set_property(&mut self, property: Property) {
        match self.properties.iter_mut().rev().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    /// Append a declaration as written, keeping earlier ones of the same name.
    pub(crate) fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Remove every declaration of `name`, returning the effective value.
    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let value = self.property_value(name)?.to_string();
        self.properties.retain(|p| p.name != name);
        Some(value)
    }

    /// The block as CSS text.
    pub fn css_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, property) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", property)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut style = StyleDeclaration::new();
        style.set_property(Property::new("color", "red", false));
        style.set_property(Property::new("margin", "0", false));
        style.set_property(Property::new("color", "blue", true));

        assert_eq!(style.len(), 2);
        assert_eq!(style.item(0).map(|p| p.value.as_str()), Some("blue"));
        assert_eq!(style.property_priority("color"), Some("important"));
        assert_eq!(style.property_priority("margin"), None);
        assert_eq!(style.to_string(), "color: blue !important; margin: 0");
    }

    #[test]
    fn remove_property() {
        let mut style = StyleDeclaration::new();
        style.set_property(Property::new("color", "red", false));
        assert_eq!(style.remove_property("color").as_deref(), Some("red"));
        assert_eq!(style.remove_property("color"), None);
        assert!(style.is_empty());
    }

    #[test]
    fn repeated_declarations_last_wins() {
        let mut style = StyleDeclaration::new();
        style.push(Property::new("background", "red", false));
        style.push(Property::new("background", "rgba(0, 0, 0, 0.5)", false));
        assert_eq!(style.property_value("background"), Some("rgba(0, 0, 0, 0.5)"));

        style.set_property(Property::new("background", "blue", false));
        assert_eq!(style.item(0).map(|p| p.value.as_str()), Some("red"));
        assert_eq!(style.property_value("background"), Some("blue"));

        assert_eq!(style.remove_property("background").as_deref(), Some("blue"));
        assert!(style.is_empty());
    }
}
