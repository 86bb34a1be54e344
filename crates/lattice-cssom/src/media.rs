//! Media lists.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of media queries, e.g. `screen, print`.
///
/// An empty list applies to all media but is not equal to a list holding
/// `all` explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MediaList {
    media: Vec<String>,
}

impl MediaList {
    /// Create an empty media list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a media list from query strings.
    pub fn from_media<I, S>(media: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            media: media.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of media queries.
    pub fn len(&self) -> usize {
        self.media.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    /// Get the query at `index`.
    pub fn item(&self, index: usize) -> Option<&str> {
        self.media.get(index).map(String::as_str)
    }

    /// Iterate over the queries.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.media.iter().map(String::as_str)
    }

    /// Append a medium unless it is already present.
    pub fn append_medium(&mut self, medium: impl Into<String>) {
        let medium = medium.into();
        if !self.media.contains(&medium) {
            self.media.push(medium);
        }
    }

    /// Remove a medium. Returns whether it was present.
    pub fn delete_medium(&mut self, medium: &str) -> bool {
        let before = self.media.len();
        self.media.retain(|m| m != medium);
        self.media.len() != before
    }

    /// The list as CSS text.
    pub fn media_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MediaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.media.join(", "))
    }
}
