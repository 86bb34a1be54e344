//! Persistence of stylesheets.
//!
//! A stylesheet is stored as JSON holding its persistent fields only.
//! Handles (ids, owner node, parent sheet, owner rule) and source locations
//! are never stored; decoding gives the sheet a fresh identity and re-points
//! every rule at it.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::media::MediaList;
use crate::rules::{RuleList, StyleSheet};

/// The persisted form of a stylesheet. Field order is the stored order.
#[derive(Serialize, Deserialize)]
struct PersistedStyleSheet {
    base_uri: Option<String>,
    css_rules: RuleList,
    disabled: bool,
    href: Option<String>,
    media: MediaList,
    read_only: bool,
    title: Option<String>,
}

impl PersistedStyleSheet {
    fn capture(sheet: &StyleSheet) -> Self {
        Self {
            base_uri: sheet.base_uri().map(str::to_string),
            css_rules: sheet.css_rules().clone(),
            disabled: sheet.disabled(),
            href: sheet.href().map(str::to_string),
            media: sheet.media().clone(),
            read_only: sheet.is_read_only(),
            title: sheet.title().map(str::to_string),
        }
    }

    fn restore(self) -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.set_base_uri(self.base_uri);
        sheet.set_css_rules(self.css_rules);
        sheet.set_disabled(self.disabled);
        sheet.set_href(self.href);
        sheet.set_media(self.media);
        sheet.set_title(self.title);
        sheet.set_read_only(self.read_only);
        sheet
    }
}

/// Encode a stylesheet to bytes.
pub fn encode(sheet: &StyleSheet) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&PersistedStyleSheet::capture(sheet))?)
}

/// Decode a stylesheet from bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<StyleSheet> {
    let persisted: PersistedStyleSheet = serde_json::from_slice(bytes)?;
    Ok(persisted.restore())
}

/// Encode a stylesheet into a writer.
pub fn encode_to_writer<W: Write>(sheet: &StyleSheet, writer: W) -> Result<()> {
    serde_json::to_writer(writer, &PersistedStyleSheet::capture(sheet))?;
    Ok(())
}

/// Decode a stylesheet from a reader.
pub fn decode_from_reader<R: Read>(reader: R) -> Result<StyleSheet> {
    let persisted: PersistedStyleSheet = serde_json::from_reader(reader)?;
    Ok(persisted.restore())
}
